use std::path::{Path, PathBuf};

use anyhow::anyhow;
use config::{Config, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_lsp::lsp_types::ClientCapabilities;
use tracing::warn;

use crate::cache::absolutize;

/// Section name used by clients for `workspace/didChangeConfiguration`.
pub const CONFIG_SECTION: &str = "gasMacroLsp";

const WORKSPACE_PLACEHOLDER: &str = "${workspaceFolder}";
const HOME_PLACEHOLDER: &str = "${userHome}";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Ordered include search directories, before placeholder expansion
    pub include_paths: Vec<String>,
    pub hover: bool,
    pub semantic_tokens: bool,
    /// Offer opcodes and registers alongside macros and labels
    pub instruction_completions: bool,
}

/// Values pushed by the editor, either as `initializationOptions` or under
/// [`CONFIG_SECTION`] in a configuration change.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub include_paths: Option<Vec<String>>,
    pub hover: Option<bool>,
    pub semantic_tokens: Option<bool>,
    pub instruction_completions: Option<bool>,
}

impl ClientSettings {
    /// Accepts both `{ "gasMacroLsp": { .. } }` and the bare section.
    ///
    /// A field of the wrong type is ignored on its own; the other fields
    /// still apply.
    pub fn from_value(value: &serde_json::Value) -> ClientSettings {
        let section = value.get(CONFIG_SECTION).unwrap_or(value);

        match serde_json::from_value(section.clone()) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("malformed client settings, keeping valid fields: {err}");
                ClientSettings {
                    include_paths: field(section, "includePaths"),
                    hover: field(section, "hover"),
                    semantic_tokens: field(section, "semanticTokens"),
                    instruction_completions: field(section, "instructionCompletions"),
                }
            }
        }
    }
}

fn field<T: DeserializeOwned>(section: &serde_json::Value, key: &str) -> Option<T> {
    let value = section.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring client setting {key}: {err}");
            None
        }
    }
}

impl Settings {
    pub fn new(
        root_dir: &Path,
        capabilities: &ClientCapabilities,
        client: &ClientSettings,
    ) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/gas-macro-lsp/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.gas-macro-lsp",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("include_paths", Vec::<String>::new())?
            .set_default("hover", true)?
            .set_default("semantic_tokens", true)?
            .set_default("instruction_completions", true)?
            .set_override_option("include_paths", client.include_paths.clone())?
            .set_override_option("hover", client.hover)?
            .set_override_option("instruction_completions", client.instruction_completions)?
            .set_override_option(
                "semantic_tokens",
                capabilities
                    .text_document
                    .as_ref()
                    .and_then(|it| match it.semantic_tokens.is_none() {
                        true => Some(false),
                        false => None,
                    })
                    .or(client.semantic_tokens),
            )?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// Include paths with `${workspaceFolder}`, `${userHome}` and a leading
    /// `~` expanded. Relative entries are taken relative to `root_dir` when
    /// known.
    pub fn resolved_include_paths(&self, root_dir: Option<&Path>) -> Vec<PathBuf> {
        let home = shellexpand::tilde("~").into_owned();

        self.include_paths
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                let mut expanded = raw.replace(HOME_PLACEHOLDER, &home);
                if let Some(root) = root_dir.and_then(Path::to_str) {
                    expanded = expanded.replace(WORKSPACE_PLACEHOLDER, root);
                }
                let expanded = PathBuf::from(shellexpand::tilde(&expanded).into_owned());

                match root_dir {
                    Some(root) if expanded.is_relative() => absolutize(&root.join(expanded)),
                    _ => absolutize(&expanded),
                }
            })
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            include_paths: vec![],
            hover: true,
            semantic_tokens: false,
            instruction_completions: true,
        }
    }
}
