//! User management commands: whoami, who, w, passwd, adduser, usermod,
//! groupadd, su.
//!
//! Accounts are not real; only `adduser` leaves a trace, a new directory
//! under `/home`. `sudo` is answered by the dispatcher since it re-runs
//! other commands.

use bitos_types::error::{BitosError, Result};
use bitos_vfs::CurrentDir;
use rand::Rng;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register user management commands into a registry.
pub fn register_user_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(WhoCmd));
    reg.register(Box::new(WCmd));
    reg.register(Box::new(PasswdCmd));
    reg.register(Box::new(AdduserCmd));
    reg.register(Box::new(UsermodCmd));
    reg.register(Box::new(GroupaddCmd));
    reg.register(Box::new(SuCmd));
}

fn known_user(env: &Environment<'_>, name: &str) -> bool {
    name == env.user
        || name == "root"
        || env
            .vfs
            .directory(env.cwd, &format!("/home/{name}"))
            .is_some()
}

// ---------------------------------------------------------------------------
// whoami / who / w
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Print effective user name"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.user.to_string()))
    }
}

struct WhoCmd;
impl Command for WhoCmd {
    fn name(&self) -> &str {
        "who"
    }
    fn description(&self) -> &str {
        "Show who is logged on"
    }
    fn usage(&self) -> &str {
        "who"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let stamp = env.clock.now().format("%b %d %Y %H:%M");
        let user = env.user;
        Ok(CommandOutput::Text(format!(
            "{user:<8} tty1         {stamp} (:0)\n{user:<8} pts/0        {stamp} (:0)"
        )))
    }
}

struct WCmd;
impl Command for WCmd {
    fn name(&self) -> &str {
        "w"
    }
    fn description(&self) -> &str {
        "Show who is logged on and what they are doing"
    }
    fn usage(&self) -> &str {
        "w"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let now = env.clock.now().format("%H:%M");
        let secs = env.clock.uptime_secs();
        let (hours, minutes) = (secs / 3_600, (secs % 3_600) / 60);
        let l1: f64 = env.rng.random_range(0.0..1.5);
        let l5: f64 = env.rng.random_range(0.0..1.0);
        let l15: f64 = env.rng.random_range(0.0..0.8);
        let user = env.user;
        Ok(CommandOutput::Text(format!(
            " {now} up  {hours}:{minutes:02},  2 users,  load average: {l1:.2}, {l5:.2}, {l15:.2}\n\
             USER     TTY      FROM             LOGIN@   IDLE   JCPU   PCPU WHAT\n\
             {user:<8} tty1     :0               08:00    0.00s  0.05s  0.02s -bash\n\
             {user:<8} pts/0    :0               08:05    0.00s  0.04s  0.00s w"
        )))
    }
}

// ---------------------------------------------------------------------------
// passwd
// ---------------------------------------------------------------------------

struct PasswdCmd;
impl Command for PasswdCmd {
    fn name(&self) -> &str {
        "passwd"
    }
    fn description(&self) -> &str {
        "Change user password"
    }
    fn usage(&self) -> &str {
        "passwd [user]"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name = args.first().copied().unwrap_or(env.user);
        if !known_user(env, name) {
            return Err(BitosError::usage(format!("passwd: user '{name}' does not exist")));
        }
        Ok(CommandOutput::Text("passwd: password updated successfully".to_string()))
    }
}

// ---------------------------------------------------------------------------
// adduser
// ---------------------------------------------------------------------------

struct AdduserCmd;
impl Command for AdduserCmd {
    fn name(&self) -> &str {
        "adduser"
    }
    fn description(&self) -> &str {
        "Add a user to the system"
    }
    fn usage(&self) -> &str {
        "adduser <user>"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&name) = args.first() else {
            return Err(BitosError::usage("adduser: Please enter a username"));
        };
        if known_user(env, name) {
            return Err(BitosError::usage(format!(
                "adduser: The user `{name}' already exists."
            )));
        }
        let mut home = CurrentDir::root();
        env.vfs.change_directory(&mut home, "/home")?;
        env.vfs
            .make_directory(&home, name)
            .map_err(|e| e.in_command("adduser"))?;
        log::debug!("created /home/{name}");

        Ok(CommandOutput::Text(format!(
            "Adding user '{name}' ...\n\
             Adding new group '{name}' (1001) ...\n\
             Adding new user '{name}' (1001) with group '{name}' ...\n\
             Creating home directory '/home/{name}' ...\n\
             Copying files from '/etc/skel' ...\n\
             New password: \n\
             Retype new password: \n\
             passwd: password updated successfully\n\
             Changing the user information for {name}\n\
             Enter the new value, or press ENTER for the default\n\
             \tFull Name []: \n\
             \tRoom Number []: \n\
             \tWork Phone []: \n\
             \tHome Phone []: \n\
             \tOther []: \n\
             Is the information correct? [Y/n] y\n\
             Adding new user '{name}' to extra groups ...\n\
             Adding user '{name}' to group 'audio' ...\n\
             Adding user '{name}' to group 'video' ...\n\
             Adding user '{name}' to group 'netdev' ..."
        )))
    }
}

// ---------------------------------------------------------------------------
// usermod
// ---------------------------------------------------------------------------

struct UsermodCmd;
impl Command for UsermodCmd {
    fn name(&self) -> &str {
        "usermod"
    }
    fn description(&self) -> &str {
        "Modify a user account"
    }
    fn usage(&self) -> &str {
        "usermod -G <group> <user> | usermod -s <shell> <user>"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            [] | [_] => Err(BitosError::usage(
                "usermod: option requires an argument -- 'option'",
            )),
            ["-G" | "--groups" | "-aG", _] => Err(BitosError::usage(
                "usermod: option requires an argument -- 'G'",
            )),
            ["-G" | "--groups" | "-aG", groups, user, ..] => Ok(CommandOutput::Text(format!(
                "usermod: user '{user}' added to group '{groups}'"
            ))),
            ["-s" | "--shell", _] => Err(BitosError::usage(
                "usermod: option requires an argument -- 's'",
            )),
            ["-s" | "--shell", shell, user, ..] => Ok(CommandOutput::Text(format!(
                "usermod: changed shell for '{user}' to '{shell}'"
            ))),
            [option, ..] => Err(BitosError::usage(format!(
                "usermod: unrecognized option '{option}'\nTry 'usermod --help' for more information."
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// groupadd
// ---------------------------------------------------------------------------

struct GroupaddCmd;
impl Command for GroupaddCmd {
    fn name(&self) -> &str {
        "groupadd"
    }
    fn description(&self) -> &str {
        "Create a new group"
    }
    fn usage(&self) -> &str {
        "groupadd <group>"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(group) = args.first() else {
            return Err(BitosError::usage("groupadd: Please enter a group name"));
        };
        Ok(CommandOutput::Text(format!("groupadd: group '{group}' added")))
    }
}

// ---------------------------------------------------------------------------
// su
// ---------------------------------------------------------------------------

struct SuCmd;
impl Command for SuCmd {
    fn name(&self) -> &str {
        "su"
    }
    fn description(&self) -> &str {
        "Run a shell as another user"
    }
    fn usage(&self) -> &str {
        "su [user]"
    }
    fn category(&self) -> &str {
        "user"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name = args
            .iter()
            .copied()
            .find(|a| !a.starts_with('-'))
            .unwrap_or("root");
        if name == "root" || known_user(env, name) {
            return Err(BitosError::usage("Password: \nsu: Authentication failure"));
        }
        Err(BitosError::usage(format!("su: user '{name}' does not exist")))
    }
}
