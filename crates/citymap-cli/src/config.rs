//! Tool configuration.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::formatter::OutputFormat;

/// What the tool does with the loaded mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Report entity counts of the mapping.
    Validate,
    /// Write the merged mapping document.
    Merge {
        /// Output document path.
        output: PathBuf,
    },
    /// Describe a single type.
    Inspect {
        /// Id of the type.
        type_id: String,
    },
    /// List the types stored in a table.
    Tables {
        /// Table name, compared case-insensitively.
        table: String,
        /// Leave out abstract types.
        skip_abstract: bool,
    },
}

/// citymap tool configuration.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Mapping documents; the first is the base, the rest are merged into it.
    pub inputs: Vec<PathBuf>,

    /// Output format.
    pub format: OutputFormat,

    /// Task to run.
    pub task: Task,
}

impl ToolConfig {
    /// Create a configuration validating the given documents.
    pub fn new(inputs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            format: OutputFormat::Text,
            task: Task::Validate,
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Add a document to merge into the base mapping.
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Number of documents merged into the base document.
    pub fn merge_count(&self) -> usize {
        self.inputs.len().saturating_sub(1)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

/// Command-line arguments for the tool.
#[derive(Parser, Debug)]
#[command(name = "citymap")]
#[command(version, about = "CityGML schema mapping tool", long_about = None)]
pub struct Args {
    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Mapping documents shared by every subcommand.
#[derive(ClapArgs, Debug)]
pub struct Inputs {
    /// Base mapping document followed by documents to merge into it
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate mapping documents
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Merge mapping documents into one document
    Merge {
        #[command(flatten)]
        inputs: Inputs,

        /// Output document
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Describe a type of the mapping
    Inspect {
        #[command(flatten)]
        inputs: Inputs,

        /// Id of the type
        #[arg(short = 't', long = "type")]
        type_id: String,
    },
    /// List the types stored in a table
    Tables {
        #[command(flatten)]
        inputs: Inputs,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Leave out abstract types
        #[arg(long)]
        skip_abstract: bool,
    },
}

impl Args {
    /// Convert command-line arguments to a tool configuration.
    pub fn into_config(self) -> ToolConfig {
        let (inputs, task) = match self.command {
            Command::Validate { inputs } => (inputs, Task::Validate),
            Command::Merge { inputs, output } => (inputs, Task::Merge { output }),
            Command::Inspect { inputs, type_id } => (inputs, Task::Inspect { type_id }),
            Command::Tables {
                inputs,
                table,
                skip_abstract,
            } => (inputs, Task::Tables { table, skip_abstract }),
        };

        ToolConfig::new(inputs.documents)
            .with_format(self.format)
            .with_task(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert!(config.inputs.is_empty());
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.task, Task::Validate);
        assert_eq!(config.merge_count(), 0);
    }

    #[test]
    fn test_config_builder() {
        let config = ToolConfig::new(["citydb.json"])
            .with_input("ade.json")
            .with_format(OutputFormat::Json)
            .with_task(Task::Inspect {
                type_id: "Building".into(),
            });

        assert_eq!(
            config.inputs,
            vec![PathBuf::from("citydb.json"), PathBuf::from("ade.json")]
        );
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.merge_count(), 1);
    }

    #[test]
    fn test_parse_tables() {
        let args = Args::try_parse_from([
            "citymap",
            "tables",
            "citydb.json",
            "ade.json",
            "--table",
            "building",
            "--skip-abstract",
        ])
        .unwrap();
        let config = args.into_config();

        assert_eq!(config.inputs.len(), 2);
        assert_eq!(
            config.task,
            Task::Tables {
                table: "building".into(),
                skip_abstract: true
            }
        );
    }

    #[test]
    fn test_parse_merge_with_format() {
        let args = Args::try_parse_from([
            "citymap",
            "--format",
            "json",
            "merge",
            "citydb.json",
            "-o",
            "merged.json",
        ])
        .unwrap();
        let config = args.into_config();

        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(
            config.task,
            Task::Merge {
                output: PathBuf::from("merged.json")
            }
        );
    }

    #[test]
    fn test_inputs_required() {
        assert!(Args::try_parse_from(["citymap", "validate"]).is_err());
        assert!(Args::try_parse_from(["citymap", "inspect", "citydb.json"]).is_err());
    }
}
