use anyhow::{bail, Result};
use expand::expand_macros;
use libw12::Image;
use pass_one::FirstPass;
use pass_two::pass_two;
use w12dbg::Sdb;

pub use error::{AsmError, Diagnostic, Diagnostics, Severity};
pub use record::{Export, ExternalUse};

mod constants;
mod directive;
mod encoder;
pub mod error;
mod expand;
pub mod files;
mod line;
mod macros;
mod operand;
mod pass_one;
mod pass_two;
mod record;
mod symbols;

/// Everything produced for a source file that assembled without errors.
#[derive(Debug, Clone)]
pub struct Output {
    pub expanded: String,
    pub image: Image,
    pub entries: Vec<Export>,
    pub externals: Vec<ExternalUse>,
    pub debug: Sdb,
}

impl Output {
    pub fn object_file(&self) -> String {
        self.image.to_string()
    }

    pub fn entries_file(&self) -> Option<String> {
        record::render(&self.entries)
    }

    pub fn externals_file(&self) -> Option<String> {
        record::render(&self.externals)
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub diagnostics: Diagnostics,
    pub output: Option<Output>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}

/// Runs macro expansion and both passes over one source text.
///
/// Every detectable problem is collected into the diagnostics. Output is only
/// produced when none of them is an error.
pub fn assemble(source: &str) -> Outcome {
    let mut expanded = expand_macros(source);
    let mut diagnostics = std::mem::take(&mut expanded.diagnostics);

    if diagnostics.has_errors() {
        return Outcome {
            diagnostics,
            output: None,
        };
    }

    let lines = expanded.text.lines().collect::<Vec<_>>();
    let pass_one = FirstPass::parse_lines(&lines, &mut diagnostics);
    let assembled = pass_two(pass_one, &mut diagnostics);

    let output = match assembled {
        Some(assembled) if !diagnostics.has_errors() => Some(Output {
            expanded: expanded.text,
            image: assembled.image,
            entries: assembled.entries,
            externals: assembled.externals,
            debug: assembled.debug,
        }),
        _ => None,
    };

    Outcome {
        diagnostics,
        output,
    }
}

fn assembled_output(program_text: &str) -> Result<Output> {
    let outcome = assemble(program_text);
    match outcome.output {
        Some(output) => Ok(output),
        None => {
            let report = outcome
                .diagnostics
                .errors()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "assembly failed with {} errors\n{}",
                outcome.diagnostics.error_count(),
                report
            )
        }
    }
}

/// Assemble a program from text into the object file format.
///
/// # Errors
///
/// If there's an error in the assembly code
pub fn assemble_program(program_text: &str) -> Result<String> {
    Ok(assembled_output(program_text)?.object_file())
}

/// The object file and its debug info as JSON.
pub fn assemble_with_debug(program_text: &str) -> Result<(String, String)> {
    let output = assembled_output(program_text)?;
    Ok((output.object_file(), output.debug.to_string()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_program() {
        assert_eq!(
            assemble_program("LOOP: mov @r1, @r2\n").unwrap(),
            "2 0\noU\nCI\n"
        );
    }

    #[test]
    fn macro_errors_skip_the_passes() {
        let outcome = assemble("mcro\nendmcro\nfoo bar\n");
        assert!(!outcome.is_success());
        assert_eq!(outcome.diagnostics.error_count(), 1);
    }

    #[test]
    fn failure_reports_every_error() {
        let err = assemble_program("mov @r1\n.entry NOPE\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("assembly failed with 2 errors"));
        assert!(message.contains("ERROR: Entry `NOPE` is not in label table at line: 2"));
    }

    #[test]
    fn debug_info() {
        let (object, debug) = assemble_with_debug("A: inc A\n").unwrap();
        assert_eq!(object, "2 0\nDs\nGS\n");
        let sdb = Sdb::from_string(&debug).unwrap();
        assert_eq!(sdb.labels.get("A"), Some(&100));
        assert_eq!(sdb.lines[0].text, "A: inc A");
    }
}
