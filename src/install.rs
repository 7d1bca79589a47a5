use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::OutputConfig;
use crate::Artifacts;

pub const DEFAULT_MAX_INLINE: usize = 8000;
const WRAP_WIDTH: usize = 76;
const HEREDOC_MARKER: &str = "FORMGEN_EOF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    PowerShell,
}

impl Shell {
    pub fn script_name(self) -> &'static str {
        match self {
            Self::Bash => "install-form.sh",
            Self::PowerShell => "install-form.ps1",
        }
    }

    fn run_script(self) -> String {
        match self {
            Self::Bash => format!("bash {}", self.script_name()),
            Self::PowerShell => format!(
                "powershell -ExecutionPolicy Bypass -File {}",
                self.script_name()
            ),
        }
    }
}

impl FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bash" | "sh" => Ok(Self::Bash),
            "powershell" | "pwsh" | "ps" => Ok(Self::PowerShell),
            other => Err(format!("unknown shell '{}', expected bash or powershell", other)),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bash => write!(f, "bash"),
            Self::PowerShell => write!(f, "powershell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallCommand {
    /// Paste-ready one-liner.
    Inline(String),
    /// Save `script` as `script_name`, then run `command`.
    Script {
        script_name: String,
        script: String,
        command: String,
    },
}

impl InstallCommand {
    /// What the user types.
    pub fn command(&self) -> &str {
        match self {
            Self::Inline(command) => command,
            Self::Script { command, .. } => command,
        }
    }
}

struct Payload<'a> {
    path: &'a str,
    encoded: String,
}

impl<'a> Payload<'a> {
    fn new(path: &'a str, contents: &str) -> Self {
        Self {
            path,
            encoded: STANDARD.encode(contents.as_bytes()),
        }
    }

    fn dir(&self) -> Option<&'a str> {
        self.path.rsplit_once('/').map(|(dir, _)| dir).filter(|d| !d.is_empty())
    }

    fn wrapped(&self) -> String {
        let mut out = String::new();
        for chunk in self.encoded.as_bytes().chunks(WRAP_WIDTH) {
            // base64 output is ASCII
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
        out
    }
}

fn bash_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn bash_inline(payloads: &[Payload]) -> String {
    let mut steps = Vec::new();
    for p in payloads {
        if let Some(dir) = p.dir() {
            steps.push(format!("mkdir -p {}", bash_quote(dir)));
        }
        steps.push(format!(
            "printf '%s' {} | base64 -d > {}",
            bash_quote(&p.encoded),
            bash_quote(p.path)
        ));
    }
    steps.join(" && ")
}

fn ps_mkdir(dir: &str) -> String {
    format!("New-Item -ItemType Directory -Force -Path {} | Out-Null", ps_quote(dir))
}

fn ps_write(path: &str, data: &str) -> String {
    format!(
        "[IO.File]::WriteAllBytes((Join-Path $PWD {}), [Convert]::FromBase64String({}))",
        ps_quote(path),
        data
    )
}

fn powershell_inline(payloads: &[Payload]) -> String {
    let mut steps = Vec::new();
    for p in payloads {
        if let Some(dir) = p.dir() {
            steps.push(ps_mkdir(dir));
        }
        steps.push(ps_write(p.path, &ps_quote(&p.encoded)));
    }
    steps.join("; ")
}

fn bash_script(payloads: &[Payload]) -> String {
    let mut out = String::from("#!/usr/bin/env bash\nset -euo pipefail\n");
    for p in payloads {
        out.push('\n');
        if let Some(dir) = p.dir() {
            out.push_str(&format!("mkdir -p {}\n", bash_quote(dir)));
        }
        out.push_str(&format!(
            "base64 -d > {} <<'{}'\n",
            bash_quote(p.path),
            HEREDOC_MARKER
        ));
        out.push_str(&p.wrapped());
        out.push_str(HEREDOC_MARKER);
        out.push('\n');
    }
    out.push_str("\necho \"Form files written.\"\n");
    out
}

fn powershell_script(payloads: &[Payload]) -> String {
    let mut out = String::from("$ErrorActionPreference = \"Stop\"\n");
    for p in payloads {
        out.push('\n');
        if let Some(dir) = p.dir() {
            out.push_str(&ps_mkdir(dir));
            out.push('\n');
        }
        out.push_str("$data = @'\n");
        out.push_str(&p.wrapped());
        out.push_str("'@\n");
        out.push_str(&ps_write(p.path, "($data -replace '\\s', '')"));
        out.push('\n');
    }
    out.push_str("\nWrite-Host \"Form files written.\"\n");
    out
}

/// Install command for the three artifacts at the configured paths.
pub fn command(
    artifacts: &Artifacts,
    output: &OutputConfig,
    shell: Shell,
    max_inline: usize,
) -> InstallCommand {
    let payloads = [
        Payload::new(&output.component, &artifacts.component),
        Payload::new(&output.schema, &artifacts.schema),
        Payload::new(&output.setup, &artifacts.setup),
    ];

    let inline = match shell {
        Shell::Bash => bash_inline(&payloads),
        Shell::PowerShell => powershell_inline(&payloads),
    };
    if inline.len() <= max_inline {
        return InstallCommand::Inline(inline);
    }

    log::info!(
        "{} one-liner is {} characters, falling back to {}",
        shell,
        inline.len(),
        shell.script_name()
    );
    let script = match shell {
        Shell::Bash => bash_script(&payloads),
        Shell::PowerShell => powershell_script(&payloads),
    };
    InstallCommand::Script {
        script_name: shell.script_name().to_string(),
        script,
        command: shell.run_script(),
    }
}
