//! Config command

use anyhow::Result;
use nightlight_core::config::LayeredConfig;
use tabled::Tabled;

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let values = inspection_map
            .into_iter()
            .map(|(key, (value, source))| {
                (
                    key,
                    ConfigEntry {
                        value,
                        source: format!("{:?}", source),
                    },
                )
            })
            .collect();
        return output.result(ConfigOutput { values });
    }

    output.section("Configuration Values");
    let rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();
    output.table(rows);

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");
    Ok(())
}
