use crate::config::ResolvedConfig;

pub fn run(resolved: ResolvedConfig) -> anyhow::Result<()> {
    println!("# source: {}", resolved.source.describe());
    print!("{}", toml::to_string_pretty(&resolved.config)?);
    if resolved.config.log_file.is_none() {
        if let Some(path) = resolved.config.monitor_log_path() {
            println!("# monitor log: {}", path.display());
        }
    }
    Ok(())
}
