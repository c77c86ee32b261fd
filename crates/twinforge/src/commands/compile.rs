//! Remote compile command handler.

use std::io::Read;
use std::path::Path;

use twinforge_core::{BuildStatus, Workbench};

use crate::cli::{CompileArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Read firmware source from a file, or stdin when the path is "-".
pub(crate) fn read_source(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Compile `source` and return the server-issued build id.
///
/// A failed compile surfaces as [`CliError::CompileFailed`] with the
/// compiler logs attached as help text.
pub(crate) async fn run_compile(
    workbench: &Workbench,
    source: &str,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    workbench.start_compile(source).await?;

    let build = workbench.snapshot().build.clone();
    match build.status {
        BuildStatus::Succeeded => {
            if !build.logs.is_empty() {
                output::print_output(&build.logs, global.quiet);
            }
            build.id.ok_or_else(|| CliError::ApiError {
                message: "compile succeeded without a build id".into(),
            })
        }
        _ => Err(CliError::CompileFailed {
            logs: (!build.logs.is_empty()).then_some(build.logs),
        }),
    }
}

pub async fn handle(
    workbench: &Workbench,
    args: CompileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = read_source(&args.source)?;
    let build_id = run_compile(workbench, &source, global).await?;
    output::print_output(&format!("build {build_id}"), global.quiet);
    Ok(())
}
