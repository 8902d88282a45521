//! Invokes the system toolchain to turn generated assembly text into a
//! standalone executable, linking in the embedded runtime object.

use crate::errors::AssembleError;
use std::path::Path;
use std::process::Command;

/// Bytes of the embedded runtime static library, built by `build.rs` from
/// `runtime/runtime.c` and baked into this binary so callers never need a
/// sibling C project on disk.
pub static RUNTIME_LIB: &[u8] = include_bytes!(env!("MINIC_RUNTIME_LIB_PATH"));

/// Options controlling how the external assembler/linker is invoked.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Keep the intermediate `.s` file next to the output executable
    /// instead of discarding it.
    pub keep_asm: bool,
    /// The `cc`-compatible driver to invoke. Defaults to `cc`.
    pub cc_driver: String,
    /// Extra arguments appended to the linker invocation, e.g. `-static`.
    pub extra_linker_args: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            keep_asm: false,
            cc_driver: "cc".to_string(),
            extra_linker_args: Vec::new(),
        }
    }
}

/// Assemble and link `asm_text` into an executable at `output_path`,
/// shelling out to `options.cc_driver`.
pub fn assemble(
    asm_text: &str,
    output_path: &Path,
    options: &CompilerOptions,
) -> Result<(), AssembleError> {
    let work_dir = output_path.parent().filter(|p| !p.as_os_str().is_empty());
    let asm_path = sibling_path(output_path, "s");
    std::fs::write(&asm_path, asm_text).map_err(AssembleError::Spawn)?;

    let runtime_path = sibling_path(output_path, "runtime.a");
    std::fs::write(&runtime_path, RUNTIME_LIB).map_err(AssembleError::Spawn)?;

    let mut command = Command::new(&options.cc_driver);
    command
        .arg(&asm_path)
        .arg(&runtime_path)
        .arg("-o")
        .arg(output_path)
        .args(&options.extra_linker_args);
    if let Some(dir) = work_dir {
        command.current_dir(dir);
    }

    let result = command.output();

    let cleanup = |keep: bool| {
        if !keep {
            let _ = std::fs::remove_file(&asm_path);
        }
        let _ = std::fs::remove_file(&runtime_path);
    };

    match result {
        Ok(output) if output.status.success() => {
            cleanup(options.keep_asm);
            Ok(())
        }
        Ok(output) => {
            cleanup(options.keep_asm);
            Err(AssembleError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(e) => {
            cleanup(options.keep_asm);
            Err(AssembleError::Spawn(e))
        }
    }
}

fn sibling_path(output_path: &Path, extension: &str) -> std::path::PathBuf {
    let mut path = output_path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "compiled_program".to_string());
    path.set_file_name(format!("{file_name}.{extension}"));
    path
}

/// `true` iff a working `cc`-compatible driver appears to be on `PATH`.
/// Used by integration tests to skip gracefully in sandboxed CI.
pub fn cc_available() -> bool {
    Command::new("cc")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_path_preserves_directory_and_swaps_extension() {
        let out = Path::new("/tmp/foo/compiled_program");
        let asm = sibling_path(out, "s");
        assert_eq!(asm, Path::new("/tmp/foo/compiled_program.s"));
    }

    #[test]
    fn default_options_use_system_cc() {
        let options = CompilerOptions::default();
        assert_eq!(options.cc_driver, "cc");
        assert!(!options.keep_asm);
        assert!(options.extra_linker_args.is_empty());
    }

    #[test]
    fn assemble_with_bogus_driver_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out");
        let options = CompilerOptions {
            cc_driver: "definitely-not-a-real-compiler-driver".to_string(),
            ..CompilerOptions::default()
        };
        let err = assemble("", &output_path, &options).unwrap_err();
        assert!(matches!(err, AssembleError::Spawn(_)));
    }

    #[test]
    fn assemble_writes_executable_when_cc_is_available() {
        if !cc_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out");
        let asm = crate::codegen::generate_assembly(&[crate::ir::Instruction::Return]).unwrap();
        assemble(&asm, &output_path, &CompilerOptions::default()).unwrap();
        assert!(output_path.exists());
    }
}
