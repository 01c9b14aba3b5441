//! Command registry and argument parsing.

use crate::app::AppError;
use crate::config::AppConfig;
use photocheckr_core::view::{SingleSource, ViewMode};
use std::ffi::OsString;
use std::path::PathBuf;

/// Help entry for one subcommand.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(name: &'static str, args: &'static str, description: &'static str) -> Self {
        Self {
            name,
            args,
            description,
        }
    }

    /// Format the usage line (e.g., "rename <tab-id> <name>").
    pub fn format(&self) -> String {
        if self.args.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, self.args)
        }
    }
}

/// Registry of all subcommands.
pub struct CommandRegistry;

impl CommandRegistry {
    pub fn all() -> Vec<CommandHelp> {
        vec![
            CommandHelp::new(
                "add",
                "<before> <after> [--name N] [--mode M] [--slider N] [--source S] [--scale N] [--notes T]",
                "Add a comparison (fills the current tab if it has no photos)",
            ),
            CommandHelp::new("tabs", "", "List comparisons"),
            CommandHelp::new("select", "<tab-id>", "Make a comparison active"),
            CommandHelp::new("rename", "<tab-id> <name>", "Rename a comparison"),
            CommandHelp::new("remove", "<tab-id>", "Delete a comparison"),
            CommandHelp::new("export", "[--png]", "Export all comparisons to PDF (or PNG)"),
            CommandHelp::new(
                "inline-gltf",
                "<scene.gltf> [files...] [-o out.gltf]",
                "Embed buffers and textures into a single glTF file",
            ),
            CommandHelp::new(
                "models",
                "<files...> [--right FILE]...",
                "Load models into the dual viewer and show its status",
            ),
            CommandHelp::new("help", "", "Show this help"),
        ]
    }

    pub fn usage() -> String {
        let mut out = String::from("Usage: photocheckr [options] <command> [args]\n\nCommands:\n");
        for command in Self::all() {
            out.push_str(&format!("  {:40} {}\n", command.format(), command.description));
        }
        out.push_str(
            "\nOptions:\n  --title T      Project title\n  --quality N    Export scale (default 2)\n  --store DIR    Project directory\n  --out DIR      Output directory (default .)\n  --project KEY  Saved project name\n",
        );
        out
    }
}

/// Settings for a new comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddArgs {
    pub before: PathBuf,
    pub after: PathBuf,
    pub name: Option<String>,
    pub mode: Option<ViewMode>,
    pub slider: Option<i32>,
    pub source: Option<SingleSource>,
    pub scale: Option<u32>,
    pub notes: Option<String>,
}

/// A parsed subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(AddArgs),
    Tabs,
    Select { id: String },
    Rename { id: String, name: String },
    Remove { id: String },
    Export { png: bool },
    InlineGltf {
        main: PathBuf,
        files: Vec<PathBuf>,
        output: Option<PathBuf>,
    },
    Models {
        left: Vec<PathBuf>,
        right: Vec<PathBuf>,
    },
    Help,
}

fn usage_error(e: pico_args::Error) -> AppError {
    AppError::Usage(e.to_string())
}

fn remaining(args: pico_args::Arguments) -> Vec<PathBuf> {
    args.finish().into_iter().map(PathBuf::from).collect()
}

fn no_extra(args: pico_args::Arguments) -> Result<(), AppError> {
    let rest = args.finish();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(AppError::Usage(format!("Unexpected arguments: {:?}", rest)))
    }
}

/// Parse the command line (without the program name).
pub fn parse_args(raw: Vec<OsString>) -> Result<(AppConfig, Command), AppError> {
    let mut args = pico_args::Arguments::from_vec(raw);
    if args.contains(["-h", "--help"]) {
        return Ok((AppConfig::default(), Command::Help));
    }

    let config = AppConfig::from_args(&mut args)?;
    let Some(name) = args.subcommand().map_err(usage_error)? else {
        return Ok((config, Command::Help));
    };

    let command = match name.as_str() {
        "add" => {
            let name = args.opt_value_from_str("--name").map_err(usage_error)?;
            let mode = args.opt_value_from_str("--mode").map_err(usage_error)?;
            let slider = args.opt_value_from_str("--slider").map_err(usage_error)?;
            let source = args.opt_value_from_str("--source").map_err(usage_error)?;
            let scale = args.opt_value_from_str("--scale").map_err(usage_error)?;
            let notes = args.opt_value_from_str("--notes").map_err(usage_error)?;
            let before = args.free_from_str().map_err(usage_error)?;
            let after = args.free_from_str().map_err(usage_error)?;
            no_extra(args)?;
            Command::Add(AddArgs {
                before,
                after,
                name,
                mode,
                slider,
                source,
                scale,
                notes,
            })
        }
        "tabs" => {
            no_extra(args)?;
            Command::Tabs
        }
        "select" | "remove" => {
            let id = args.free_from_str().map_err(usage_error)?;
            no_extra(args)?;
            if name == "select" {
                Command::Select { id }
            } else {
                Command::Remove { id }
            }
        }
        "rename" => {
            let id = args.free_from_str().map_err(usage_error)?;
            let new_name = args.free_from_str().map_err(usage_error)?;
            no_extra(args)?;
            Command::Rename { id, name: new_name }
        }
        "export" => {
            let png = args.contains("--png");
            no_extra(args)?;
            Command::Export { png }
        }
        "inline-gltf" => {
            let output = args
                .opt_value_from_os_str(["-o", "--output"], |s| {
                    Ok::<_, std::convert::Infallible>(PathBuf::from(s))
                })
                .map_err(usage_error)?;
            let main = args.free_from_str().map_err(usage_error)?;
            Command::InlineGltf {
                main,
                files: remaining(args),
                output,
            }
        }
        "models" => {
            let right = args
                .values_from_os_str("--right", |s| {
                    Ok::<_, std::convert::Infallible>(PathBuf::from(s))
                })
                .map_err(usage_error)?;
            Command::Models {
                left: remaining(args),
                right,
            }
        }
        "help" => Command::Help,
        other => return Err(AppError::Usage(format!("Unknown command: {}", other))),
    };
    Ok((config, command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<(AppConfig, Command), AppError> {
        parse_args(line.split_whitespace().map(OsString::from).collect())
    }

    #[test]
    fn test_format() {
        let help = CommandHelp::new("tabs", "", "List comparisons");
        assert_eq!(help.format(), "tabs");
        let help = CommandHelp::new("remove", "<tab-id>", "Delete");
        assert_eq!(help.format(), "remove <tab-id>");
        assert!(CommandRegistry::usage().contains("inline-gltf"));
    }

    #[test]
    fn test_parse_add() {
        let (config, command) =
            parse("--title Kitchen add a.jpg b.jpg --mode side-by-side --slider 30").unwrap();
        assert_eq!(config.title.as_deref(), Some("Kitchen"));
        let Command::Add(add) = command else {
            panic!("expected add");
        };
        assert_eq!(add.before, PathBuf::from("a.jpg"));
        assert_eq!(add.after, PathBuf::from("b.jpg"));
        assert_eq!(add.mode, Some(ViewMode::SideBySide));
        assert_eq!(add.slider, Some(30));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("").unwrap().1, Command::Help);
        assert_eq!(parse("--help").unwrap().1, Command::Help);
        assert_eq!(parse("tabs").unwrap().1, Command::Tabs);
        assert_eq!(parse("export --png").unwrap().1, Command::Export { png: true });
        assert_eq!(
            parse("rename t1 Hallway").unwrap().1,
            Command::Rename {
                id: "t1".to_string(),
                name: "Hallway".to_string()
            }
        );
    }

    #[test]
    fn test_parse_file_lists() {
        assert_eq!(
            parse("inline-gltf scene.gltf scene.bin tex.png -o out.gltf").unwrap().1,
            Command::InlineGltf {
                main: PathBuf::from("scene.gltf"),
                files: vec![PathBuf::from("scene.bin"), PathBuf::from("tex.png")],
                output: Some(PathBuf::from("out.gltf")),
            }
        );
        assert_eq!(
            parse("models a.glb --right b.obj").unwrap().1,
            Command::Models {
                left: vec![PathBuf::from("a.glb")],
                right: vec![PathBuf::from("b.obj")],
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("frobnicate"), Err(AppError::Usage(_))));
        assert!(matches!(parse("add only-one.jpg"), Err(AppError::Usage(_))));
        assert!(matches!(parse("tabs extra"), Err(AppError::Usage(_))));
        assert!(matches!(parse("add a b --mode grid"), Err(AppError::Usage(_))));
    }
}
