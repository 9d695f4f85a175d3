use crate::{ClientOptions, debugmode::GROUP};

fn get_prog_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()?
        .to_str()?
        .to_owned()
        .into()
}

fn client_name_for(prog: Option<&str>) -> String {
    match prog {
        Some("agent") => format!("agent.debugmode.{GROUP}"),
        Some("operator") => format!("controller.debugmode.{GROUP}"),
        _ => format!("debugmode.{GROUP}"),
    }
}

/// Identity of the running binary, e.g. `agent.debugmode.k8s.cloudogu.com`
pub fn get_client_name() -> String {
    client_name_for(get_prog_name().as_deref())
}

fn short_name_of(long: &str) -> String {
    let lst = long.split('.').collect::<Vec<&str>>();
    if lst.len() > 4 {
        format!("{}-{}", lst[1], lst[0])
    } else {
        "debugmode".to_string()
    }
}

/// Short form of [`get_client_name`], used as field manager
pub fn get_short_name() -> String {
    short_name_of(&get_client_name())
}

/// Options with the field manager set to the binary's identity
pub fn get_client_options() -> ClientOptions {
    ClientOptions {
        field_manager: Some(get_short_name()),
        ..ClientOptions::default()
    }
}
