use code_insight::recording::{
    BlockId, ExecutionRecorder, FunctionId, ModuleId, ModuleInfo, ModuleInfoBuilder,
};
use code_insight::text::TextPos;
use code_insight::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary working directory for one CLI invocation.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> std::io::Result<Self> {
        Ok(TestContext {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: impl AsRef<[u8]>) -> std::io::Result<PathBuf> {
        let file_path = self.temp_path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;
        Ok(file_path)
    }

    /// Command running inside the temp dir, so no stray config is picked up.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cmd();
        cmd.current_dir(self.temp_dir.path());
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new().expect("Failed to create test context")
    }
}

#[allow(deprecated)]
pub fn cmd() -> assert_cmd::Command {
    let mut cmd =
        assert_cmd::Command::cargo_bin("code-insight").expect("Failed to find code-insight binary");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

pub fn sample_module() -> ModuleInfo {
    let mut builder = ModuleInfoBuilder::new("dist/main.js");
    let f0 = builder.declare_function(TextPos::new(0, 0)).unwrap();
    builder.declare_block(f0, TextPos::new(1, 2)).unwrap();
    let f1 = builder.declare_function(TextPos::new(3, 0)).unwrap();
    builder.declare_block(f1, TextPos::new(4, 2)).unwrap();
    builder.finish()
}

/// 0 SetModuleId(0), 1 SetModuleInfo, 2 CallFunction(0), 3 ReachedBlock(0),
/// 4 CallFunction(1), 5 ReachedBlock(0), 6 ReturnFunction, 7 ReturnFunction
pub fn sample_trace() -> Vec<u8> {
    let mut recorder =
        ExecutionRecorder::new(|_: ModuleId| -> Result<ModuleInfo> { Ok(sample_module()) });
    recorder.record_function_enter(ModuleId(0), FunctionId(0)).unwrap();
    recorder.record_block_execution(BlockId(0)).unwrap();
    recorder.record_function_enter(ModuleId(0), FunctionId(1)).unwrap();
    recorder.record_block_execution(BlockId(0)).unwrap();
    recorder.record_function_return();
    recorder.record_function_return();
    recorder.into_bytes()
}
