const DEFAULT_EXPORTER_PORT: u16 = 9100;

pub fn get_default_exporter_port() -> u16 {
    DEFAULT_EXPORTER_PORT
}

const DEFAULT_SMTP_PORT: u16 = 587;

pub fn get_default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

const DEFAULT_CHECK_INTERVAL: u64 = 60;

pub fn get_default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL
}

pub fn get_default_use_tls() -> bool {
    true
}

const SMTP_PASSWORD: &str = "SMTP_PASSWORD";

pub fn get_smtp_password() -> Option<String> {
    let password_from_env = std::env::var(SMTP_PASSWORD);
    password_from_env.ok()
}
