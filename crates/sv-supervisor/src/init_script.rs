// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generated `/etc/init.d/<class-name>` script and install instructions.

use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitScriptError {
    #[error("not permitted to write to {0}")]
    NotPermitted(PathBuf),
    #[error("failed to write init script: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the init script body for `class_name`, launched via
/// `interpreter filename`.
pub fn render(class_name: &str, interpreter: &str, filename: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Generated init script for {class_name}\n\
         PIDFILE=/var/run/{class_name}.pid\n\n\
         case \"$1\" in\n\
         \x20 start)\n\
         \x20   {interpreter} {filename} -d -p \"$PIDFILE\"\n\
         \x20   ;;\n\
         \x20 stop)\n\
         \x20   kill \"$(cat \"$PIDFILE\")\"\n\
         \x20   ;;\n\
         \x20 restart)\n\
         \x20   \"$0\" stop\n\
         \x20   \"$0\" start\n\
         \x20   ;;\n\
         \x20 status)\n\
         \x20   kill -0 \"$(cat \"$PIDFILE\" 2>/dev/null)\" 2>/dev/null\n\
         \x20   exit $?\n\
         \x20   ;;\n\
         \x20 *)\n\
         \x20   echo \"Usage: $0 {{start|stop|restart|status}}\"\n\
         \x20   exit 1\n\
         \x20   ;;\n\
         esac\n"
    )
}

/// Writes the init script to `/etc/init.d/<class_name>` with mode 0755.
pub fn write(
    class_name: &str,
    interpreter: &str,
    filename: &str,
) -> Result<PathBuf, InitScriptError> {
    let path = PathBuf::from(format!("/etc/init.d/{class_name}"));
    write_to(&path, class_name, interpreter, filename)?;
    Ok(path)
}

fn write_to(
    path: &Path,
    class_name: &str,
    interpreter: &str,
    filename: &str,
) -> Result<(), InitScriptError> {
    let body = render(class_name, interpreter, filename);
    std::fs::write(path, body).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            InitScriptError::NotPermitted(path.to_path_buf())
        } else {
            InitScriptError::Io(e)
        }
    })?;

    #[cfg(unix)]
    {
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Human-readable instructions for installing the generated script.
pub fn install_instructions(class_name: &str) -> String {
    format!(
        "Run with -I to generate /etc/init.d/{class_name}, then:\n\
         \x20   sudo update-rc.d {class_name} defaults    # Debian/Ubuntu\n\
         \x20   sudo chkconfig --add {class_name}         # RHEL/CentOS\n"
    )
}

#[cfg(test)]
#[path = "init_script_tests.rs"]
mod tests;
