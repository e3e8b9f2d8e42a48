//! Incremental build tests against a scripted toolchain.
//!
//! The compiler and linker are small shell scripts that log each call and write the
//! files a real toolchain would, so the engine runs its real process path.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use filetime::{FileTime, set_file_mtime};
use mnm_lib::{BuildError, BuildState, Phase, ProcessRunner, ProjectConfig, Sequencer, SilentReporter, Toolchain};
use tempfile::TempDir;

const FAKE_CXX: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
out=""
src=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  case "$arg" in *.cpp|*.c|*.cxx) src="$arg" ;; esac
  prev="$arg"
done
echo "cxx $src" >> "$log"
case "$src" in *broken*) echo "error: broken source" >&2; exit 1 ;; esac
echo object > "$out"
printf '%s: \\\n %s\n' "$out" "$src" > "${out%.o}.d"
"#;

const FAKE_LINK: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
echo "link $*" >> "$log"
echo module > "$out"
"#;

struct Fixture {
  temp: TempDir,
  config: ProjectConfig,
}

impl Fixture {
  fn new(sources: &[&str]) -> Self {
    let temp = TempDir::new().unwrap();
    let tools = temp.path().join("tools");
    std::fs::create_dir_all(&tools).unwrap();
    let cxx = write_script(&tools.join("cxx"), FAKE_CXX);
    let link = write_script(&tools.join("link"), FAKE_LINK);

    for source in sources {
      let path = temp.path().join(source);
      std::fs::create_dir_all(path.parent().unwrap()).unwrap();
      std::fs::write(path, "int f() { return 1; }\n").unwrap();
    }

    let mut config = ProjectConfig::for_project(temp.path(), Toolchain::Gnu);
    config.compiler = cxx.display().to_string();
    config.linker = link.display().to_string();
    Self { temp, config }
  }

  fn path(&self, rel: &str) -> PathBuf {
    self.temp.path().join(rel)
  }

  fn state(&self) -> BuildState {
    let mut state = BuildState::new(&self.config);
    state.append_source_dir("src").unwrap();
    state
  }

  fn calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.path("tools/calls.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  fn clear_calls(&self) {
    let _ = std::fs::remove_file(self.path("tools/calls.log"));
  }

  fn count(&self, prefix: &str) -> usize {
    self.calls().iter().filter(|c| c.starts_with(prefix)).count()
  }

  fn set_mtime(&self, rel: &str, secs: i64) {
    set_file_mtime(self.path(rel), FileTime::from_unix_time(secs, 0)).unwrap();
  }

  async fn build(&self, state: &mut BuildState) -> Result<(), BuildError> {
    Sequencer::new(&self.config, &ProcessRunner, &SilentReporter)
      .build(state)
      .await
  }
}

fn write_script(path: &Path, content: &str) -> PathBuf {
  std::fs::write(path, content).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path.to_path_buf()
}

#[tokio::test]
async fn rebuild_touches_only_changed_sources() {
  let fx = Fixture::new(&["src/a.cpp", "src/b.cpp"]);
  let mut state = fx.state();

  fx.build(&mut state).await.unwrap();
  assert_eq!(fx.count("cxx "), 2);
  assert_eq!(fx.count("link "), 1);
  assert!(fx.path("build/Release/native_bindings.node").exists());
  assert!(fx.path("build/Release/src/a.d").exists());

  fx.set_mtime("src/a.cpp", 1_000);
  fx.set_mtime("src/b.cpp", 1_000);
  fx.set_mtime("build/Release/src/a.o", 2_000);
  fx.set_mtime("build/Release/src/b.o", 2_000);
  fx.set_mtime("build/Release/native_bindings.node", 3_000);

  fx.clear_calls();
  fx.build(&mut state).await.unwrap();
  assert!(fx.calls().is_empty(), "unexpected calls: {:?}", fx.calls());

  fx.set_mtime("src/a.cpp", 4_000);
  fx.clear_calls();
  fx.build(&mut state).await.unwrap();

  let a = fx.path("src/a.cpp").display().to_string();
  assert_eq!(fx.calls()[0], format!("cxx {}", a));
  assert_eq!(fx.count("cxx "), 1);
  assert_eq!(fx.count("link "), 1);
}

#[tokio::test]
async fn broken_source_fails_batch_but_compiles_the_rest() {
  let fx = Fixture::new(&["src/a.cpp", "src/broken.cpp", "src/c.cpp"]);
  let mut state = fx.state();

  let mut sequencer = Sequencer::new(&fx.config, &ProcessRunner, &SilentReporter);
  let err = sequencer.build(&mut state).await.unwrap_err();

  assert!(matches!(err, BuildError::CompileFailed { ref failed, total: 3 } if failed.len() == 1));
  assert_eq!(sequencer.phase(), Phase::Failed);
  assert_eq!(fx.count("cxx "), 3);
  assert_eq!(fx.count("link "), 0);
  assert!(fx.path("build/Release/src/a.o").exists());
  assert!(fx.path("build/Release/src/c.o").exists());
  assert_eq!(state.objects().len(), 3);
}

#[tokio::test]
async fn link_alone_uses_objects_from_an_earlier_compile() {
  let fx = Fixture::new(&["src/a.cpp", "src/b.cpp"]);

  let mut first = fx.state();
  Sequencer::new(&fx.config, &ProcessRunner, &SilentReporter)
    .compile(&mut first)
    .await
    .unwrap();
  assert_eq!(fx.count("link "), 0);

  let mut second = fx.state();
  Sequencer::new(&fx.config, &ProcessRunner, &SilentReporter)
    .link(&mut second)
    .await
    .unwrap();

  let link_calls: Vec<_> = fx.calls().into_iter().filter(|c| c.starts_with("link ")).collect();
  assert_eq!(link_calls.len(), 1);
  assert!(link_calls[0].contains(&fx.path("build/Release/src/a.o").display().to_string()));
  assert!(link_calls[0].contains(&fx.path("build/Release/src/b.o").display().to_string()));
}

#[tokio::test]
async fn missing_compiler_counts_as_failed_file() {
  let mut fx = Fixture::new(&["src/a.cpp"]);
  fx.config.compiler = fx.path("tools/no-such-compiler").display().to_string();
  let mut state = fx.state();

  let err = fx.build(&mut state).await.unwrap_err();
  assert!(matches!(err, BuildError::CompileFailed { total: 1, .. }));
}
