//! Three-stage textual substitution over a skill's instructions (spec
//! §4.8), grounded on the original implementation's `executor.py`.
//!
//! The stages run in a fixed order and each sees the previous stage's
//! output:
//!
//! 1. **Arguments** — `$ARGUMENTS` and `$ARGUMENTS[N]` (0-indexed), then
//!    `$1`..`$9` (1-indexed), substituted from the invocation's argument
//!    string, split on whitespace with quote-awareness.
//! 2. **Variables** — `${VAR_NAME}`, looked up first in a caller-supplied
//!    context map (keys upper-cased), then in the process environment.
//!    Unresolved variables are left verbatim.
//! 3. **Dynamic commands** — `` !`cmd` ``, run as a subprocess with a
//!    30-second timeout. On success, replaced with the command's trimmed
//!    stdout; on any failure or timeout, replaced with an empty string —
//!    this stage never fails the whole substitution.

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use std::sync::LazyLock;
use tokio::process::Command;
use tokio::time::timeout;

const DYNAMIC_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

static ARGUMENTS_INDEXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$ARGUMENTS\[(\d+)\]").expect("valid regex"));
static ARGUMENTS_WHOLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$ARGUMENTS").expect("valid regex"));
static POSITIONAL_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([1-9])").expect("valid regex"));
static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
static DYNAMIC_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!`([^`]*)`").expect("valid regex"));

/// Split an argument string on whitespace, honoring single and double
/// quotes as grouping (quotes themselves are stripped).
fn split_arguments(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for ch in raw.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
            }
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

fn substitute_arguments(text: &str, raw_arguments: &str) -> String {
    let parts = split_arguments(raw_arguments);

    let text = ARGUMENTS_INDEXED
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let index: usize = caps[1].parse().unwrap_or(usize::MAX);
            parts.get(index).cloned().unwrap_or_default()
        })
        .into_owned();
    let text = ARGUMENTS_WHOLE.replace_all(&text, raw_arguments).into_owned();
    POSITIONAL_ARG
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            let index: usize = caps[1].parse::<usize>().unwrap_or(0).saturating_sub(1);
            parts.get(index).cloned().unwrap_or_default()
        })
        .into_owned()
}

fn substitute_variables(text: &str, context: &HashMap<String, String>) -> String {
    let upper: HashMap<String, &str> =
        context.iter().map(|(k, v)| (k.to_uppercase(), v.as_str())).collect();
    VARIABLE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            if let Some(value) = upper.get(&name.to_uppercase()) {
                (*value).to_string()
            } else if let Ok(value) = std::env::var(name) {
                value
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

async fn run_dynamic_command(cmd: &str) -> String {
    let output = timeout(DYNAMIC_COMMAND_TIMEOUT, Command::new("sh").arg("-c").arg(cmd).output()).await;
    match output {
        Ok(Ok(output)) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        _ => String::new(),
    }
}

async fn substitute_dynamic_commands(text: &str) -> String {
    let commands: Vec<String> =
        DYNAMIC_COMMAND.captures_iter(text).map(|c| c[1].to_string()).collect();
    let mut result = String::new();
    let mut last_end = 0;
    let mut command_outputs = Vec::with_capacity(commands.len());
    for cmd in &commands {
        command_outputs.push(run_dynamic_command(cmd).await);
    }
    for (mat, output) in DYNAMIC_COMMAND.find_iter(text).zip(command_outputs) {
        result.push_str(&text[last_end..mat.start()]);
        result.push_str(&output);
        last_end = mat.end();
    }
    result.push_str(&text[last_end..]);
    result
}

/// Run all three substitution stages over `instructions`, in order.
///
/// `raw_arguments` is the whole argument string as passed by the caller
/// (e.g. the operator's `/skill-name foo bar` invocation text, or the
/// LLM's `arguments` tool-call parameter). `context` supplies variables
/// for stage two before falling back to the process environment.
pub async fn substitute(
    instructions: &str,
    raw_arguments: &str,
    context: &HashMap<String, String>,
) -> String {
    let text = substitute_arguments(instructions, raw_arguments);
    let text = substitute_variables(&text, context);
    substitute_dynamic_commands(&text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_arguments() {
        let parts = split_arguments(r#"foo "bar baz" qux"#);
        assert_eq!(parts, vec!["foo", "bar baz", "qux"]);
    }

    #[test]
    fn substitutes_whole_and_indexed_arguments() {
        let text = substitute_arguments("all: $ARGUMENTS first: $ARGUMENTS[0] second: $1", "alpha beta");
        assert_eq!(text, "all: alpha beta first: alpha second: alpha");
    }

    #[test]
    fn substitutes_variables_from_context_then_env() {
        let mut ctx = HashMap::new();
        ctx.insert("session_id".to_string(), "abc123".to_string());
        let text = substitute_variables("session is ${SESSION_ID}, unknown is ${NOPE_VAR}", &ctx);
        assert_eq!(text, "session is abc123, unknown is ${NOPE_VAR}");
    }

    #[tokio::test]
    async fn dynamic_command_runs_and_substitutes() {
        let text = substitute_dynamic_commands("today is !`echo hello`").await;
        assert_eq!(text, "today is hello");
    }

    #[tokio::test]
    async fn dynamic_command_failure_becomes_empty_string() {
        let text = substitute_dynamic_commands("result: !`exit 1`").await;
        assert_eq!(text, "result: ");
    }

    #[tokio::test]
    async fn full_pipeline_runs_all_three_stages() {
        let mut ctx = HashMap::new();
        ctx.insert("session_id".to_string(), "s-1".to_string());
        let out = substitute(
            "arg=$ARGUMENTS session=${SESSION_ID} echoed=!`echo hi`",
            "myarg",
            &ctx,
        )
        .await;
        assert_eq!(out, "arg=myarg session=s-1 echoed=hi");
    }
}
