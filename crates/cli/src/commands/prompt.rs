//! `skychat prompt`: render the prompt without calling the backend.

use std::path::Path;

use skychat_context::{ChatCommand, ConversationContextBuilder};

use super::MessageArgs;

pub async fn run(config_path: Option<&Path>, args: MessageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let channel = super::open_transcript(&args.transcript, &config).await?;

    let command = ChatCommand::parse(
        &args.message,
        &config.bot.prefix,
        &config.bot.default_middle_section,
    )
    .ok_or_else(|| format!("Message does not start with the command prefix '{}'", config.bot.prefix))?;

    let builder = ConversationContextBuilder::from_config(&config);
    let context = builder
        .build(&channel, &args.inbound(), &command.middle_section)
        .await?;

    println!("{}", context.render_prompt());
    Ok(())
}
