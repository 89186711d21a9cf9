use anyhow::{Context as _, Result};
use clap::Args;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::commands::{print_json, Context};
use mailglean_core::{ExclusionSet, Extractor};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// File to extract from; stdin when absent
    pub file: Option<PathBuf>,
}

pub fn extract(ctx: &Context<'_>, args: ExtractArgs) -> Result<()> {
    let body = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read input file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    let extractor = Extractor::new(ExclusionSet::new(ctx.config.exclude.iter().cloned()));
    let result = extractor.extract(&body);

    if ctx.json {
        return print_json(&result);
    }

    print_list("Names", &result.names);
    print_list("Emails", &result.emails);
    print_list("Addresses", &result.addresses);
    print_list("Phones", &result.phones);
    Ok(())
}

fn print_list(label: &str, values: &[String]) {
    println!("{} ({}):", label, values.len());
    for value in values {
        println!("- {}", value);
    }
}
