pub const APP_NAME: &str = "mnm";

/// Name of the linked module when none is configured.
pub const DEFAULT_TARGET: &str = "native_bindings";

/// Suffix of the final loadable module.
pub const MODULE_SUFFIX: &str = "node";

/// Suffix of compiler-emitted dependency files.
pub const DEPFILE_SUFFIX: &str = "d";

/// Flag group passed to the compiler.
pub const COMPILE_FLAGS: &str = "CXXFLAGS";

/// Flag group passed to the linker.
pub const LINK_FLAGS: &str = "LINKFLAGS";

/// Directory under the output dir holding objects of sources outside the project.
pub const EXTERNAL_OBJECTS_DIR: &str = "_external";

/// Source extensions picked up when registering a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "cxx"];

/// Environment variable naming the host runtime installation.
pub const RUNTIME_HOME_ENV: &str = "NODE_HOME";

/// Environment variables overriding the compiler and linker programs.
pub const COMPILER_ENV: &str = "CXX";
pub const LINKER_ENV: &str = "CXXLD";
