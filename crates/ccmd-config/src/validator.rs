//! Runtime validation of loaded configuration.

use crate::schema::{Config, CustomCommand};
use ccmd_common::{is_valid_command_name, CcmdError, MAX_COMMAND_DESCRIPTION_LENGTH};
use std::fmt;

/// A single problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human readable description of the problem.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration validator.
///
/// Duplicate command names pass validation; the reconciler reports and
/// skips them.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, joining every issue into one error.
    pub fn validate(config: &Config) -> Result<(), CcmdError> {
        let issues = Self::issues(config);
        if issues.is_empty() {
            return Ok(());
        }

        let joined = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CcmdError::Config(joined))
    }

    /// Lists every problem in a configuration.
    pub fn issues(config: &Config) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if config.discord.token.trim().is_empty() {
            issues.push(issue(
                "discord.token",
                "Please set the Discord bot token and restart",
            ));
        }

        if config.discord.request_timeout_seconds == 0 {
            issues.push(issue(
                "discord.request_timeout_seconds",
                "must be greater than zero",
            ));
        }

        for (index, command) in config.custom_commands.iter().enumerate() {
            check_command(index, command, &mut issues);
        }

        issues
    }
}

fn check_command(index: usize, command: &CustomCommand, issues: &mut Vec<ValidationIssue>) {
    let prefix = format!("custom_commands[{index}]");

    if !is_valid_command_name(&command.name) {
        issues.push(issue(
            format!("{prefix}.name"),
            format!(
                "`{}` must be 1-32 lowercase letters, digits, '-' or '_'",
                command.name
            ),
        ));
    }

    let description_length = command.description.chars().count();
    if description_length == 0 || description_length > MAX_COMMAND_DESCRIPTION_LENGTH {
        issues.push(issue(
            format!("{prefix}.description"),
            format!("must be 1-{MAX_COMMAND_DESCRIPTION_LENGTH} characters"),
        ));
    }

    if command.reply.color_value().is_none() {
        issues.push(issue(
            format!("{prefix}.reply.color"),
            format!("`{}` is not a #RRGGBB colour", command.reply.color),
        ));
    }
}

fn issue(field: impl Into<String>, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field: field.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ReplyTemplate;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.discord.token = "token".to_string();
        config
    }

    #[test]
    fn test_default_config_only_lacks_token() {
        let issues = ConfigValidator::issues(&Config::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "discord.token");
    }

    #[test]
    fn test_duplicates_are_not_a_validation_error() {
        let mut config = valid_config();
        config.custom_commands = vec![
            CustomCommand::new("ip", "first"),
            CustomCommand::new("ip", "second"),
        ];
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_reports_every_bad_command_field() {
        let mut config = valid_config();
        config.custom_commands = vec![CustomCommand::new("Bad Name", "")
            .reply(ReplyTemplate {
                description: "hi".to_string(),
                color: "green".to_string(),
            })];

        let fields: Vec<_> = ConfigValidator::issues(&config)
            .into_iter()
            .map(|issue| issue.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "custom_commands[0].name",
                "custom_commands[0].description",
                "custom_commands[0].reply.color",
            ]
        );
    }

    #[test]
    fn test_disabled_commands_are_still_checked() {
        let mut config = valid_config();
        config.custom_commands = vec![CustomCommand::new("", "empty").enabled(false)];
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.discord.request_timeout_seconds = 0;
        let error = ConfigValidator::validate(&config).unwrap_err();
        assert!(error.to_string().contains("request_timeout_seconds"));
    }
}
