use mention_kit_core::parse_site_toml;
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating site at: {}", path.display());

    let config_path = path.join("site.toml");
    let config = parse_site_toml(&config_path)?;

    println!("✓ site.toml valid");
    println!("  Site: {} by {}", config.title, config.author);
    println!("  Language: {} ({})", config.lang, config.og_locale);
    match &config.webmentions {
        Some(wm) => println!("  Webmentions endpoint: {}", wm.link),
        None => println!("  Webmentions: not configured"),
    }
    println!("  Social links: {}", config.social_links.len());

    Ok(())
}
