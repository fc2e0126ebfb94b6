pub const DEFAULT_SERVER_FILES: &str = "/serverfiles";

pub const DEFAULT_BINARY_NAME: &str = "DayZServer";

pub const DEFAULT_PROFILES_DIR: &str = "/profiles";

pub const DEFAULT_SERVER_PORT: u16 = 2302;

pub const CONFIG_FILE_NAME: &str = "warden.toml";

pub const MOD_PARAM_FILE_NAME: &str = "mod_param";

pub const SERVER_MOD_PARAM_FILE_NAME: &str = "server_mod_param";

pub const SERVER_PARAMS_FILE_NAME: &str = "server_params";

pub const SERVER_CFG_NAME: &str = "serverDZ.cfg";

pub const BATTLEYE_DIR_NAME: &str = "battleye";
