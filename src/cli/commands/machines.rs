//! `rotoworks machines` command - List the machine catalog

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::render_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::machine::CATALOG;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let machines = &CATALOG;

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let list: Vec<_> = machines
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "name": m.name(),
                        "sub_types": m.sub_types,
                        "features": m.scope_columns,
                        "curtis": m.supports_curtis(),
                    })
                })
                .collect();
            let out = if global.format == OutputFormat::Json {
                serde_json::to_string_pretty(&list).into_diagnostic()?
            } else {
                serde_yml::to_string(&list).into_diagnostic()?
            };
            println!("{}", out);
        }
        format => {
            let rows = machines.iter().map(|m| {
                vec![
                    m.name().to_string(),
                    m.sub_types.join(", "),
                    m.scope_columns.join(", "),
                ]
            });
            print!("{}", render_table(format, ["Machine", "Sub types", "Features"], rows)?);
        }
    }
    Ok(())
}
