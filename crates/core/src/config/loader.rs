//! Configuration file loader for the `.copilot/` directory.
//!
//! - `config.toml`: orchestrator settings
//! - `agents/*.md`: agent profiles with YAML front matter
//! - `knowledge/*.yaml`: knowledge sources

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::knowledge::KnowledgeSource;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use pc_protocol::{AgentProfile, OrchestratorSettings};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".copilot";

/// Loads all configuration from the `.copilot/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.copilot/` folder
///
/// # Returns
///
/// An `AppConfig` with everything found. Missing directories or files
/// fall back to defaults rather than errors.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML, or Markdown front matter)
/// - Settings are unusable or knowledge ids repeat
///
/// # Example
///
/// ```rust,no_run
/// use pc_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Self-correction ceiling: {}", config.settings.max_correction_attempts);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_dir = root.join(CONFIG_DIR);

    if !config_dir.exists() {
        return Ok(AppConfig::default());
    }

    let settings = load_settings(&config_dir)?;
    let agents = load_agents(&config_dir)?;
    let knowledge = load_knowledge(&config_dir)?;

    tracing::debug!(
        dir = %config_dir.display(),
        agents = agents.len(),
        knowledge = knowledge.len(),
        "Loaded configuration"
    );

    Ok(AppConfig {
        settings,
        agents,
        knowledge,
    })
}

fn load_settings(config_dir: &Path) -> ConfigResult<OrchestratorSettings> {
    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(OrchestratorSettings::default());
    }

    let content = read_file(&config_path)?;

    let settings: OrchestratorSettings =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    let invalid = |reason: &str| ConfigError::InvalidConfig {
        path: config_path.clone(),
        reason: reason.to_string(),
    };
    if settings.max_correction_attempts == 0 {
        return Err(invalid("max_correction_attempts must be at least 1"));
    }
    if settings.agent_timeout_secs == 0 {
        return Err(invalid("agent_timeout_secs must be at least 1"));
    }
    if settings.signal_buffer == 0 {
        return Err(invalid("signal_buffer must be at least 1"));
    }
    if !(0.0..=1.0).contains(&settings.intent_confidence_floor) {
        return Err(invalid("intent_confidence_floor must be within [0, 1]"));
    }

    Ok(settings)
}

/// Loads all agent profiles from `agents/*.md`.
fn load_agents(config_dir: &Path) -> ConfigResult<Vec<AgentProfile>> {
    let agents_dir = config_dir.join("agents");
    let mut agents = Vec::new();

    for path in files_with_extension(&agents_dir, &["md"])? {
        let content = read_file(&path)?;

        let matter = Matter::<YAML>::new();
        let result = matter.parse(&content);

        let mut agent: AgentProfile = result
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.clone(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.clone(),
                reason: format!("Failed to deserialize front matter: {}", e),
            })?;

        agent.system_prompt = result.content;
        agents.push(agent);
    }

    Ok(agents)
}

/// Loads all knowledge sources from `knowledge/*.yaml`.
fn load_knowledge(config_dir: &Path) -> ConfigResult<Vec<KnowledgeSource>> {
    let knowledge_dir = config_dir.join("knowledge");
    let mut sources = Vec::new();
    let mut ids = HashSet::new();

    for path in files_with_extension(&knowledge_dir, &["yaml", "yml"])? {
        let content = read_file(&path)?;

        let source: KnowledgeSource =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.clone(),
                source,
            })?;

        if !ids.insert(source.id.clone()) {
            return Err(ConfigError::InvalidConfig {
                path,
                reason: format!("Duplicate knowledge source id '{}'", source.id),
            });
        }
        sources.push(source);
    }

    Ok(sources)
}

fn read_file(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Direct children of `dir` with one of `extensions`, sorted by file name.
fn files_with_extension(dir: &Path, extensions: &[&str]) -> ConfigResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matches {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let config_dir = root.join(CONFIG_DIR);

        fs::create_dir_all(config_dir.join("agents")).expect("Failed to create agents dir");
        fs::create_dir_all(config_dir.join("knowledge")).expect("Failed to create knowledge dir");

        fs::write(
            config_dir.join("config.toml"),
            "max_correction_attempts = 2\nagent_timeout_secs = 30",
        )
        .expect("Failed to write config.toml");

        let agent_md = r#"---
name: process-architect
description: Turns an outline into a process map
model: gpt-4o-mini
command: copilot-llm
args: ["--json"]
---

You are a system architect. Transform the process definition list into a map."#;
        fs::write(config_dir.join("agents/process-architect.md"), agent_md)
            .expect("Failed to write agent file");

        let knowledge_yaml = r#"id: leave-policy
file_name: leave_policy.pdf
extracted_text: "Employees accrue 15 days of leave per year."
description: HR leave policy
"#;
        fs::write(config_dir.join("knowledge/leave-policy.yaml"), knowledge_yaml)
            .expect("Failed to write knowledge file");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.settings.max_correction_attempts, 2);
        assert_eq!(config.settings.agent_timeout_secs, 30);
        assert_eq!(config.settings.knowledge_char_limit, 3000);

        assert_eq!(config.agents.len(), 1);
        let agent = &config.agents[0];
        assert_eq!(agent.name, "process-architect");
        assert_eq!(agent.command.as_deref(), Some("copilot-llm"));
        assert!(
            agent.system_prompt.contains("system architect"),
            "System prompt should be loaded from markdown body"
        );

        assert_eq!(config.knowledge.len(), 1);
        assert_eq!(config.knowledge[0].id, "leave-policy");
        assert_eq!(config.knowledge[0].file_name, "leave_policy.pdf");
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .copilot");

        assert_eq!(config.settings, OrchestratorSettings::default());
        assert!(config.agents.is_empty());
        assert!(config.knowledge.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "max_correction_attempts = [invalid").unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("config.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_rejects_zero_attempts() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "max_correction_attempts = 0").unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::InvalidConfig { reason, .. }) = result {
            assert!(reason.contains("max_correction_attempts"));
        } else {
            panic!("Expected InvalidConfig error");
        }
    }

    #[tokio::test]
    async fn test_load_config_invalid_knowledge_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("knowledge")).unwrap();
        fs::write(config_dir.join("knowledge/broken.yaml"), "id: x\n  file_name: [yaml").unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::YamlParse { path, .. }) = result {
            assert!(path.ends_with("broken.yaml"));
        } else {
            panic!("Expected YamlParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_duplicate_knowledge_id() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("knowledge")).unwrap();
        for name in ["a.yaml", "b.yml"] {
            fs::write(config_dir.join("knowledge").join(name), "id: same\nfile_name: f.txt\n").unwrap();
        }

        let result = load_config(dir.path()).await;

        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_load_config_agent_no_frontmatter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("agents")).unwrap();
        fs::write(config_dir.join("agents/test.md"), "Just plain markdown content").unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::MarkdownParse { path, reason }) = result {
            assert!(path.ends_with("test.md"));
            assert!(reason.contains("Missing YAML front matter"));
        } else {
            panic!("Expected MarkdownParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_agent_invalid_frontmatter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("agents")).unwrap();

        let invalid_frontmatter = r#"---
name: input-guard
# Missing required field: model
---

Agent content"#;
        fs::write(config_dir.join("agents/test.md"), invalid_frontmatter).unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::MarkdownParse { reason, .. }) = result {
            assert!(reason.contains("Failed to deserialize"));
        } else {
            panic!("Expected MarkdownParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_ignores_non_matching_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("agents")).unwrap();
        fs::create_dir_all(config_dir.join("knowledge")).unwrap();

        fs::write(config_dir.join("agents/readme.txt"), "Not a markdown file").unwrap();
        fs::write(config_dir.join("knowledge/notes.txt"), "Not a yaml file").unwrap();
        fs::write(
            config_dir.join("agents/guard.md"),
            "---\nname: input-guard\nmodel: mock\n---\n\nGuard prompt",
        )
        .unwrap();

        let config = load_config(dir.path()).await.expect("Should ignore non-matching files");

        assert_eq!(config.agents.len(), 1);
        assert!(config.knowledge.is_empty());
    }
}
