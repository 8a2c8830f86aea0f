//! Chain command: show the order a call would walk

use anyhow::Result;
use colored::*;
use relay_core::{ChainResolver, RouterConfig};
use std::path::Path;
use std::process::ExitCode;

pub fn show(name: &str, config_path: &Path) -> Result<ExitCode> {
    let config = super::load_config(config_path)?;
    let chain = ChainResolver::new(&config).resolve(name)?;
    for line in render(&config, &chain) {
        println!("{}", line);
    }
    Ok(ExitCode::SUCCESS)
}

fn render(config: &RouterConfig, chain: &[String]) -> Vec<String> {
    chain
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let label = config
                .target(name)
                .map(|target| target.label())
                .unwrap_or_default();
            let marker = if index == 0 { "primary" } else { "fallback" };
            format!(
                "{:>2}. {} {} [{}]",
                index + 1,
                name.bold(),
                label.dimmed(),
                marker
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{FallbackChains, ModelTarget, ProviderKind};

    #[test]
    fn test_render_marks_primary_and_fallbacks() {
        colored::control::set_override(false);
        let config = RouterConfig::new(
            vec![
                ModelTarget::new("a", ProviderKind::OpenAi, "gpt-4o"),
                ModelTarget::new("b", ProviderKind::Anthropic, "claude"),
            ],
            FallbackChains::new().with_rule("a", ["b"]),
        );
        let chain = ChainResolver::new(&config).resolve("a").unwrap();

        let lines = render(&config, &chain);
        assert_eq!(
            lines,
            vec![
                " 1. a openai:gpt-4o [primary]".to_string(),
                " 2. b anthropic:claude [fallback]".to_string(),
            ]
        );
    }
}
