//! Embed replies for custom command interactions.

use crate::framework::{Data, Error};
use ccmd_config::ReplyTemplate;
use poise::serenity_prelude as serenity;
use std::collections::BTreeMap;
use tracing::debug;

/// Replaces `{key}` tokens with values from `placeholders`.
///
/// The key runs from the last `{` before each `}`, so `{{key}}` becomes
/// `{value}`. Unknown keys and unbalanced braces are kept as written.
pub fn fill_placeholders(text: &str, placeholders: &BTreeMap<String, String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(close) = rest.find('}') {
        let head = &rest[..close];
        match head.rfind('{') {
            Some(open) => {
                output.push_str(&head[..open]);
                let key = &head[open + 1..];
                match placeholders.get(key) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(key);
                        output.push('}');
                    }
                }
            }
            None => {
                output.push_str(head);
                output.push('}');
            }
        }
        rest = &rest[close + 1..];
    }

    output.push_str(rest);
    output
}

/// Renders a reply template into an embed.
pub fn render_embed(
    template: &ReplyTemplate,
    placeholders: &BTreeMap<String, String>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .description(fill_placeholders(&template.description, placeholders));

    match template.color_value() {
        Some(colour) => embed.colour(colour),
        None => embed,
    }
}

fn reply_embed(data: &Data, name: &str) -> Option<serenity::CreateEmbed> {
    let routes = data.routes.load();
    let template = routes.reply_for(name)?;
    let config = data.config.get();
    Some(render_embed(template, &config.placeholders))
}

/// Answers a command interaction if it belongs to a routed custom command.
pub async fn respond(
    ctx: &serenity::Context,
    interaction: &serenity::CommandInteraction,
    data: &Data,
) -> Result<(), Error> {
    let name = interaction.data.name.as_str();
    let Some(embed) = reply_embed(data, name) else {
        debug!(command = %name, "No custom command route, ignoring interaction");
        return Ok(());
    };

    let message = serenity::CreateInteractionResponseMessage::new().embed(embed);
    interaction
        .create_response(&ctx.http, serenity::CreateInteractionResponse::Message(message))
        .await?;

    debug!(command = %name, user = %interaction.user.name, "Answered custom command");
    Ok(())
}
