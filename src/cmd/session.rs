use anyhow::Result;
use serde_json::json;

use medtime::core::session::SessionContext;
use medtime::models::config::Config;
use medtime::models::user::User;
use medtime::output;

pub fn run_login(uid: &str, email: Option<&str>, name: Option<&str>, human: bool) -> Result<()> {
    let uid = uid.trim();
    if uid.is_empty() {
        anyhow::bail!("user id must not be empty");
    }
    let mut session = SessionContext::load(&Config::session_path())?;
    let mut user = User::new(uid);
    user.email = email.map(String::from);
    user.display_name = name.map(String::from);
    session.login(user.clone())?;

    if human {
        println!("Signed in as {}", user.display_name.as_deref().unwrap_or(&user.uid));
    } else {
        let out = output::success("login", json!({ "user": user }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_logout(human: bool) -> Result<()> {
    let mut session = SessionContext::load(&Config::session_path())?;
    let previous = session.logout()?;

    if human {
        match &previous {
            Some(u) => println!("Signed out {}", u.uid),
            None => println!("Nobody was signed in"),
        }
    } else {
        let out = output::success("logout", json!({ "user": previous }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_whoami(human: bool) -> Result<()> {
    let session = SessionContext::load(&Config::session_path())?;
    let user = session.user();

    if human {
        match user {
            Some(u) => {
                let mut line = u.uid.clone();
                if let Some(n) = &u.display_name {
                    line.push_str(&format!(" ({n})"));
                }
                if let Some(e) = &u.email {
                    line.push_str(&format!(" <{e}>"));
                }
                println!("{line}");
            }
            None => println!("Not signed in"),
        }
    } else {
        let out = output::success("whoami", json!({ "user": user }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
