use crate::artifacts::files::{find_single_in_dir, read_lines};
use crate::artifacts::naming::split_cracked_output_name;
use crate::error_handling::types::CredsError;
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredsStatus {
    Found,
    NotFound,
}

/// One recovered account/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrutedAcc {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrutedCreds {
    pub status: CredsStatus,
    pub creds: Vec<BrutedAcc>,
}

impl BrutedCreds {
    fn not_found() -> Self {
        Self {
            status: CredsStatus::NotFound,
            creds: Vec::new(),
        }
    }
}

/// Joins a cracking session's output artifact back to the dump file it was
/// run against and pairs each cracked secret with its account.
pub struct CredsCorrelator {
    cracked_dir: PathBuf,
    dumps_dir: PathBuf,
}

impl CredsCorrelator {
    pub fn new(cracked_dir: PathBuf, dumps_dir: PathBuf) -> Self {
        Self {
            cracked_dir,
            dumps_dir,
        }
    }

    /// Collects the credentials cracked by `session_id`.
    ///
    /// Every lookup miss along the way resolves to `not_found` with an empty
    /// list; only a filesystem read failure on a located file is an error.
    ///
    /// The final match is a substring scan: a cracked hash is paired with
    /// every dump line containing it anywhere, not just in the hash field.
    pub fn bruted_creds(&self, session_id: &Uuid) -> Result<BrutedCreds, CredsError> {
        let session_name = session_id.to_string();

        let Some(cracked_path) = find_single_in_dir(&self.cracked_dir, &session_name) else {
            error!(
                "The cracked hashes file for session {} not found in {}",
                session_name,
                self.cracked_dir.display()
            );
            return Ok(BrutedCreds::not_found());
        };

        let cracked_file_name = cracked_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some((hash_file_stem, _)) = split_cracked_output_name(&cracked_file_name) else {
            error!(
                "The file name of {} couldn't be split into two parts",
                cracked_path.display()
            );
            return Ok(BrutedCreds::not_found());
        };

        let Some(dump_path) = find_single_in_dir(&self.dumps_dir, hash_file_stem) else {
            error!(
                "The dump file used for session {} not found in {}",
                session_name,
                self.dumps_dir.display()
            );
            return Ok(BrutedCreds::not_found());
        };

        let cracked_lines = read_lines(&cracked_path)?;
        let dump_lines = read_lines(&dump_path)?;

        let mut creds = Vec::new();
        for cracked_line in &cracked_lines {
            let Some((hash, password)) = cracked_line.split_once(':') else {
                if !cracked_line.is_empty() {
                    warn!("Cracked line {:?} has no hash separator", cracked_line);
                }
                continue;
            };
            if hash.is_empty() {
                warn!("Cracked line {:?} has an empty hash field", cracked_line);
                continue;
            }

            for dump_line in &dump_lines {
                if dump_line.contains(hash) {
                    let login = dump_line.split(':').next().unwrap_or("").to_string();
                    creds.push(BrutedAcc {
                        login,
                        password: password.to_string(),
                    });
                }
            }
        }

        info!("Got {} creds for session {}", creds.len(), session_name);
        if creds.is_empty() {
            return Ok(BrutedCreds::not_found());
        }
        Ok(BrutedCreds {
            status: CredsStatus::Found,
            creds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct Fixture {
        _root: tempfile::TempDir,
        cracked: PathBuf,
        dumps: PathBuf,
        correlator: CredsCorrelator,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let cracked = root.path().join("cracked");
        let dumps = root.path().join("dumps");
        for dir in [&cracked, &dumps] {
            std::fs::create_dir_all(dir).unwrap();
        }
        let correlator = CredsCorrelator::new(cracked.clone(), dumps.clone());
        Fixture {
            _root: root,
            cracked,
            dumps,
            correlator,
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn round_trips_a_cracked_account() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(
            &fx.dumps,
            "dc01_all_users.ntds",
            "S-1-5-21-3623811015-3361044348-30300820-1001:1000:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::\n",
        );
        write(
            &fx.cracked,
            &format!("dc01_all_users.ntds___{}.txt", session),
            "31d6cfe0d16ae931b73c59d7e0c089c0:Summer2024!\n",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();

        assert_eq!(result.status, CredsStatus::Found);
        assert_eq!(
            result.creds,
            vec![BrutedAcc {
                login: "S-1-5-21-3623811015-3361044348-30300820-1001".to_string(),
                password: "Summer2024!".to_string(),
            }]
        );
    }

    #[test]
    fn missing_cracked_file_is_not_found() {
        let fx = fixture();
        let result = fx.correlator.bruted_creds(&Uuid::new_v4()).unwrap();

        assert_eq!(result.status, CredsStatus::NotFound);
        assert!(result.creds.is_empty());
    }

    #[test]
    fn undelimited_cracked_file_name_is_not_found() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(&fx.cracked, &format!("nodelimiter{}.txt", session), "a:b\n");

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.status, CredsStatus::NotFound);
    }

    #[test]
    fn doubly_delimited_cracked_file_name_is_not_found() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(
            &fx.cracked,
            &format!("a___b___{}.txt", session),
            "31d6cfe0d16ae931b73c59d7e0c089c0:pw\n",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.status, CredsStatus::NotFound);
    }

    #[test]
    fn missing_dump_file_is_not_found() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(
            &fx.cracked,
            &format!("dc01_all_users.ntds___{}.txt", session),
            "31d6cfe0d16ae931b73c59d7e0c089c0:pw\n",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.status, CredsStatus::NotFound);
    }

    #[test]
    fn uncracked_session_yields_not_found_with_empty_list() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(&fx.dumps, "dc01_all_users.ntds", "admin:1000:aaa:bbb:::\n");
        write(
            &fx.cracked,
            &format!("dc01_all_users.ntds___{}.txt", session),
            "",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.status, CredsStatus::NotFound);
        assert!(result.creds.is_empty());
    }

    #[test]
    fn passwords_containing_colons_survive_the_split() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(
            &fx.dumps,
            "dc01_all_users.ntds",
            "admin:1000:aad3b435b51404eeaad3b435b51404ee:0123456789abcdef0123456789abcdef:::\n",
        );
        write(
            &fx.cracked,
            &format!("dc01_all_users.ntds___{}.txt", session),
            "0123456789abcdef0123456789abcdef:pa:ss:wd\n",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.creds[0].password, "pa:ss:wd");
    }

    #[test]
    fn one_cracked_hash_can_match_several_accounts() {
        let fx = fixture();
        let session = Uuid::new_v4();
        write(
            &fx.dumps,
            "dc01_all_users.ntds",
            "alice:1000:x:31d6cfe0d16ae931b73c59d7e0c089c0:::\n\
             bob:1001:x:31d6cfe0d16ae931b73c59d7e0c089c0:::\n",
        );
        write(
            &fx.cracked,
            &format!("dc01_all_users.ntds___{}.txt", session),
            "31d6cfe0d16ae931b73c59d7e0c089c0:blank\n",
        );

        let result = fx.correlator.bruted_creds(&session).unwrap();
        assert_eq!(result.creds.len(), 2);
        assert_eq!(result.creds[0].login, "alice");
        assert_eq!(result.creds[1].login, "bob");
    }
}
