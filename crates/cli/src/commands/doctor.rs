//! `skychat doctor`: check config, backend reachability, and a transcript.

use std::path::Path;

use skychat_config::AppConfig;
use skychat_core::channel::Channel;

pub async fn run(
    config_path: Option<&Path>,
    transcript: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("SkyChat Doctor: System Diagnostics");
    println!("==================================\n");

    let mut issues = 0;

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] {e}");
            println!("\n  1 issue found. Fix the config before running other checks.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
        issues += check_backend(&config).await;
    } else {
        println!("  [warn] No API key configured (CHATGPT_API_KEY)");
        issues += 1;
    }

    if let Some(path) = transcript {
        issues += check_transcript(path, &config).await;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }
    Ok(())
}

async fn check_backend(config: &AppConfig) -> usize {
    let provider = match skychat_providers::build_from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            println!("  [fail] Backend not usable: {e}");
            return 1;
        }
    };
    match provider.health_check().await {
        Ok(true) => {
            println!("  [ok]   Backend reachable at {}", config.chat.api_url);
            0
        }
        Ok(false) => {
            println!("  [fail] Backend at {} rejected the model listing", config.chat.api_url);
            1
        }
        Err(e) => {
            println!("  [fail] Backend unreachable: {e}");
            1
        }
    }
}

async fn check_transcript(path: &Path, config: &AppConfig) -> usize {
    let channel = match super::open_transcript(path, config).await {
        Ok(channel) => channel,
        Err(e) => {
            println!("  [fail] Transcript unreadable: {e}");
            return 1;
        }
    };
    match channel.health_check().await {
        Ok(true) => {
            println!(
                "  [ok]   Transcript {} ({} messages)",
                path.display(),
                channel.messages().await.len()
            );
            0
        }
        Ok(false) => {
            println!("  [fail] Transcript {} is not healthy", path.display());
            1
        }
        Err(e) => {
            println!("  [fail] Transcript check failed: {e}");
            1
        }
    }
}
