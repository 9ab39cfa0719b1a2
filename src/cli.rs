use clap::{Parser, Subcommand};

/// qlvenv - per-project virtual environment manager for task platforms
#[derive(Parser, Debug)]
#[command(name = "qlvenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working-copy root holding one subdirectory per project
    #[arg(long, value_name = "DIR", global = true)]
    pub scripts_dir: Option<String>,

    /// Source-repository root mirroring the scripts layout
    #[arg(long, value_name = "DIR", global = true)]
    pub repo_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create (or refresh) the environments for a project
    Create {
        /// Project name under the scripts root
        #[arg(value_name = "PROJECT")]
        project: String,

        /// Rebuild from scratch even when dependencies are unchanged
        #[arg(long)]
        force: bool,
    },

    /// List all project environments
    List,

    /// Show a detailed report for one project's environments
    Info {
        /// Project name under the scripts root
        #[arg(value_name = "PROJECT")]
        project: String,
    },

    /// Delete a project's environments and state file
    Remove {
        /// Project name under the scripts root
        #[arg(value_name = "PROJECT")]
        project: String,
    },

    /// Print the shell commands that enter a project's environment
    Activate {
        /// Project name under the scripts root
        #[arg(value_name = "PROJECT")]
        project: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_with_force() {
        let cli = Cli::try_parse_from(["qlvenv", "create", "demo", "--force"]).unwrap();
        match cli.command {
            Commands::Create { project, force } => {
                assert_eq!(project, "demo");
                assert!(force);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_global_dir_overrides_parse_after_subcommand() {
        let cli =
            Cli::try_parse_from(["qlvenv", "list", "--scripts-dir", "/tmp/scripts"]).unwrap();
        assert_eq!(cli.scripts_dir.as_deref(), Some("/tmp/scripts"));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["qlvenv"]).is_err());
    }
}
