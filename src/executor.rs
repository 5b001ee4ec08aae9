use log::{debug, error};
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::display::Display;
use crate::error::{Result, TfimportError};
use crate::types::ImportRecord;

/// Stores the child process ID for signal handling, 0 when no child is running
static CHILD_PID: AtomicU32 = AtomicU32::new(0);

/// Totals of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Runs `terraform import` for every record, one after the other.
/// A failing import is reported and the run moves on to the next record.
pub fn execute_imports(records: &[ImportRecord], working_dir: &Path) -> Result<ExecutionSummary> {
    let running = setup_signal_handler()?;
    run_imports(records, working_dir, "terraform", running)
}

/// Sets up the Ctrl+C signal handler
fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        let pid = CHILD_PID.load(Ordering::SeqCst);
        if pid != 0 {
            Display::print_header("\nReceived Ctrl+C, terminating...");
            #[cfg(unix)]
            {
                use nix::sys::signal::{self, Signal};
                use nix::unistd::Pid;
                let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }
    })
    .map_err(|e| TfimportError::CommandExecutionError(e.to_string()))?;

    Ok(running)
}

fn run_imports(
    records: &[ImportRecord],
    working_dir: &Path,
    program: &str,
    running: Arc<AtomicBool>,
) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();

    for record in records {
        if !running.load(Ordering::SeqCst) {
            summary.cancelled = true;
            break;
        }
        match execute_import(program, record, working_dir) {
            Ok(()) => summary.succeeded += 1,
            Err(TfimportError::TerraformError(msg)) => {
                Display::print_warning(&msg);
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if !running.load(Ordering::SeqCst) {
        summary.cancelled = true;
        Display::print_header("\nOperation cancelled by user");
    }

    Ok(summary)
}

/// Executes a single `terraform import` in the given directory
fn execute_import(program: &str, record: &ImportRecord, working_dir: &Path) -> Result<()> {
    let mut command = Command::new(program);
    command
        .arg("import")
        .arg(&record.address)
        .arg(&record.import_id)
        .current_dir(working_dir);

    Display::print_command(&format!(
        "{} import {} {}",
        program, record.address, record.import_id
    ));
    debug!("Executing terraform command in directory: {:?}", working_dir);
    debug!("Full command: {:?}", command);

    let mut child = command
        .spawn()
        .map_err(|e| TfimportError::CommandExecutionError(e.to_string()))?;

    CHILD_PID.store(child.id(), Ordering::SeqCst);
    let status = child.wait();
    CHILD_PID.store(0, Ordering::SeqCst);

    match status {
        Ok(status) if status.success() => {
            debug!("Imported {}", record.address);
            Ok(())
        }
        Ok(status) => {
            let error_msg = format!(
                "Import of {} failed with status: {}",
                record.address, status
            );
            error!("{}", error_msg);
            Err(TfimportError::TerraformError(error_msg))
        }
        Err(e) => {
            let error_msg = format!("Failed to execute terraform command: {}", e);
            error!("{}", error_msg);
            Err(TfimportError::CommandExecutionError(error_msg))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn records() -> Vec<ImportRecord> {
        vec![
            ImportRecord {
                address: "aws_instance.web".to_string(),
                import_id: "i-123".to_string(),
            },
            ImportRecord {
                address: "aws_instance.db".to_string(),
                import_id: "i-456".to_string(),
            },
        ]
    }

    #[test]
    fn test_successful_commands_are_counted() {
        let running = Arc::new(AtomicBool::new(true));
        let summary = run_imports(&records(), Path::new("."), "true", running).unwrap();
        assert_eq!(
            summary,
            ExecutionSummary {
                succeeded: 2,
                failed: 0,
                cancelled: false
            }
        );
    }

    #[test]
    fn test_failures_do_not_stop_the_run() {
        let running = Arc::new(AtomicBool::new(true));
        let summary = run_imports(&records(), Path::new("."), "false", running).unwrap();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 2);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let running = Arc::new(AtomicBool::new(true));
        let result = run_imports(
            &records(),
            Path::new("."),
            "tfimport-no-such-binary",
            running,
        );
        assert!(matches!(
            result,
            Err(TfimportError::CommandExecutionError(_))
        ));
    }

    #[test]
    fn test_cancelled_run_stops_early() {
        let running = Arc::new(AtomicBool::new(false));
        let summary = run_imports(&records(), Path::new("."), "true", running).unwrap();
        assert_eq!(summary.succeeded, 0);
        assert!(summary.cancelled);
    }
}
