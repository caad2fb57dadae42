pub const APP_NAME: &str = "dxcpkg";

/// Environment variable that overrides the default work directory.
pub const WORK_DIR_ENV: &str = "DXCPKG_WORK_DIR";

pub const UPSTREAM_URL: &str = "https://github.com/microsoft/DirectXShaderCompiler.git";
pub const UPSTREAM_TAG: &str = "v1.7.2308";
pub const PACKAGE_VERSION: &str = "1.7.2308";

/// Windows SDK version handed to `hctbuild.cmd`.
pub const WINDOWS_SDK_VERSION: &str = "10.0.20348.0";

/// CMake cache with the project's predefined parameters, relative to the checkout.
pub const PREDEFINED_PARAMS: &str = "cmake/caches/PredefinedParams.cmake";

/// Header tree shipped in `include/`, relative to the checkout.
pub const HEADER_SUBDIR: &str = "include/dxc";

pub const LINK_NAME: &str = "dxcompiler";

pub const DEFAULT_NINJA_JOBS: u32 = 4;

/// 315532800 = January 1, 1980 00:00:00 UTC (ZIP epoch)
pub const SOURCE_DATE_EPOCH: &str = "315532800";
