use regex::Regex;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::duration::format_duration;
use crate::error::{Result, TimerError};
use crate::notify;
use crate::sequence::CountdownSpec;

static NAME_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*\.Name\s*\}\}").unwrap());
static DURATION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*\.Duration\s*\}\}").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionAction {
    /// A shell-style command template, e.g. `say '{{.Name}} is done!'`.
    Command(String),
    /// A desktop notification.
    Notify,
}

/// Runs the completion actions for a finished countdown, one after the
/// other, stopping at the first failing command.
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    actions: Vec<CompletionAction>,
}

impl HookRunner {
    pub fn new(actions: Vec<CompletionAction>) -> Self {
        HookRunner { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn run(&self, spec: &CountdownSpec) -> Result<()> {
        for action in &self.actions {
            match action {
                CompletionAction::Command(template) => run_command(template, spec)?,
                CompletionAction::Notify => notify::send_completion(spec),
            }
        }
        Ok(())
    }
}

pub fn render_template(template: &str, spec: &CountdownSpec) -> String {
    let with_name = NAME_FIELD.replace_all(template, regex::NoExpand(&spec.name));
    let duration = format_duration(spec.duration);
    DURATION_FIELD
        .replace_all(&with_name, regex::NoExpand(&duration))
        .into_owned()
}

/// Expands the template and splits it into a program and its arguments.
pub fn command_line(template: &str, spec: &CountdownSpec) -> Result<Vec<String>> {
    let rendered = render_template(template, spec);
    let parse_error = || TimerError::Hook {
        command: template.to_string(),
        reason: "failed to parse command".to_string(),
    };
    let parts = shlex::split(&rendered).ok_or_else(parse_error)?;
    if parts.is_empty() {
        return Err(parse_error());
    }
    Ok(parts)
}

fn run_command(template: &str, spec: &CountdownSpec) -> Result<()> {
    let parts = command_line(template, spec)?;
    let (program, args) = parts.split_first().ok_or_else(|| TimerError::Hook {
        command: template.to_string(),
        reason: "empty command".to_string(),
    })?;

    info!(command = %program, name = %spec.name, "running completion hook");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| TimerError::Hook {
            command: program.clone(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(TimerError::Hook {
            command: program.clone(),
            reason: status.to_string(),
        });
    }
    debug!(command = %program, "completion hook finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn work() -> CountdownSpec {
        CountdownSpec::new("work", Duration::from_secs(1500))
    }

    #[test]
    fn template_substitutes_name_and_duration() {
        assert_eq!(
            render_template("say '{{.Name}} is done!'", &work()),
            "say 'work is done!'"
        );
        assert_eq!(
            render_template("notify {{ .Name }} {{.Duration}}", &work()),
            "notify work 25m0s"
        );
    }

    #[test]
    fn name_with_dollar_is_inserted_literally() {
        let spec = CountdownSpec::new("$1 task", Duration::from_secs(1));
        assert_eq!(render_template("echo {{.Name}}", &spec), "echo $1 task");
    }

    #[test]
    fn command_line_splits_shell_words() {
        let parts = command_line("terminal-notifier -message '{{ .Name }} is done'", &work()).unwrap();
        assert_eq!(parts, ["terminal-notifier", "-message", "work is done"]);
    }

    #[test]
    fn unterminated_quote_is_a_hook_error() {
        let err = command_line("say '{{.Name}} is done!", &work()).unwrap_err();
        assert!(matches!(err, TimerError::Hook { .. }));
    }

    #[test]
    fn blank_command_is_a_hook_error() {
        assert!(matches!(
            command_line("   ", &work()),
            Err(TimerError::Hook { .. })
        ));
    }

    #[test]
    fn empty_runner_succeeds() {
        let runner = HookRunner::default();
        assert!(runner.is_empty());
        assert!(runner.run(&work()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_runs() {
        let runner = HookRunner::new(vec![CompletionAction::Command("true".to_string())]);
        assert!(runner.run(&work()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_aborts() {
        let runner = HookRunner::new(vec![
            CompletionAction::Command("false".to_string()),
            CompletionAction::Command("true".to_string()),
        ]);
        let err = runner.run(&work()).unwrap_err();
        assert!(matches!(err, TimerError::Hook { ref command, .. } if command == "false"));
    }

    #[test]
    fn missing_program_is_a_hook_error() {
        let runner = HookRunner::new(vec![CompletionAction::Command(
            "definitely-not-a-real-program-4f1c".to_string(),
        )]);
        assert!(matches!(runner.run(&work()), Err(TimerError::Hook { .. })));
    }
}
