use std::{io::Read, path::PathBuf};

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    pwvault_core::{KdfParams, KeySource, Unpacked, VaultSession},
    secrecy::SecretString,
    tracing::info,
};

use crate::generate_commands::trim_newline;

/// Environment variable holding the master passphrase.
const PASSPHRASE_ENV: &str = "PWVAULT_PASSPHRASE";

/// Exit status when a stored secret cannot be recovered.
const EXIT_UNRECOVERABLE: u8 = 2;

/// The master passphrase is never taken from argv, where it would show up
/// in process listings and shell history. It comes from
/// `PWVAULT_PASSPHRASE` or from `--passphrase-file`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Account email; also salts the key.
    #[arg(long, env = "PWVAULT_EMAIL")]
    pub email: String,
    /// Read the master passphrase from the first line of this file
    /// instead of PWVAULT_PASSPHRASE.
    #[arg(long, env = "PWVAULT_PASSPHRASE_FILE")]
    pub passphrase_file: Option<PathBuf>,
    /// Derive the key from the account id instead of a passphrase.
    /// Only for vaults written by older clients.
    #[arg(long, env = "PWVAULT_USER_ID", conflicts_with = "passphrase_file")]
    pub user_id: Option<String>,
}

impl KeyArgs {
    fn passphrase(&self) -> Result<Option<SecretString>> {
        if let Some(path) = &self.passphrase_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let line = raw.lines().next().unwrap_or_default();
            if line.is_empty() {
                bail!("{} does not contain a passphrase", path.display());
            }
            return Ok(Some(SecretString::new(line.to_owned())));
        }
        Ok(std::env::var(PASSPHRASE_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(SecretString::new))
    }

    fn source(&self) -> Result<KeySource> {
        self.source_from(self.passphrase()?)
    }

    fn source_from(&self, passphrase: Option<SecretString>) -> Result<KeySource> {
        match (passphrase, &self.user_id) {
            (Some(passphrase), None) => Ok(KeySource::Passphrase {
                passphrase,
                email: self.email.clone(),
            }),
            (None, Some(user_id)) => Ok(KeySource::LegacyIdentity {
                user_id: user_id.clone(),
                email: self.email.clone(),
            }),
            (Some(_), Some(_)) => bail!("a passphrase and --user-id cannot be combined"),
            (None, None) => {
                bail!("set {PASSPHRASE_ENV}, pass --passphrase-file, or pass --user-id")
            },
        }
    }

    fn session(&self, params: &KdfParams) -> Result<VaultSession> {
        let user_id = self.user_id.clone().unwrap_or_else(|| self.email.clone());
        Ok(VaultSession::start(user_id, &self.source()?, params)?)
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(trim_newline(buf))
}

pub fn handle_seal(key: &KeyArgs, params: &KdfParams) -> Result<()> {
    let session = key.session(params)?;
    let stored = session.pack(&read_stdin()?)?;
    info!("secret sealed");
    println!("{stored}");
    Ok(())
}

/// Returns the process exit status.
pub fn handle_open(key: &KeyArgs, params: &KdfParams) -> Result<u8> {
    let session = key.session(params)?;
    Ok(report(&session.unpack(&read_stdin()?)))
}

fn report(unpacked: &Unpacked) -> u8 {
    println!("{}", unpacked.display());
    match unpacked {
        Unpacked::Failed { reason, .. } => {
            eprintln!("unable to decrypt: {reason:?}");
            EXIT_UNRECOVERABLE
        },
        Unpacked::Legacy(_) => {
            eprintln!("note: secret was stored in the legacy base64 format; re-seal it");
            0
        },
        Unpacked::Secret(_) => 0,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, pwvault_core::UnpackFailure};

    fn key_args(passphrase_file: Option<PathBuf>, user_id: Option<&str>) -> KeyArgs {
        KeyArgs {
            email: "a@b.c".into(),
            passphrase_file,
            user_id: user_id.map(Into::into),
        }
    }

    fn passphrase_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn passphrase_file_selects_passphrase() {
        let (_dir, path) = passphrase_file("correct horse\nignored\n");
        let args = key_args(Some(path), None);
        let passphrase = args.passphrase().unwrap();
        assert!(passphrase.is_some());
        let source = args.source_from(passphrase).unwrap();
        assert!(matches!(source, KeySource::Passphrase { .. }));
    }

    #[test]
    fn empty_passphrase_file_is_rejected() {
        let (_dir, path) = passphrase_file("\n");
        assert!(key_args(Some(path), None).passphrase().is_err());
    }

    #[test]
    fn user_id_selects_legacy_identity() {
        let source = key_args(None, Some("u1")).source_from(None).unwrap();
        assert!(matches!(source, KeySource::LegacyIdentity { .. }));
    }

    #[test]
    fn passphrase_with_user_id_is_an_error() {
        let passphrase = Some(SecretString::new("pw".into()));
        assert!(key_args(None, Some("u1")).source_from(passphrase).is_err());
    }

    #[test]
    fn no_secret_is_an_error() {
        assert!(key_args(None, None).source_from(None).is_err());
    }

    #[test]
    fn sessions_from_same_passphrase_share_a_key() {
        let params = KdfParams::Pbkdf2 { iterations: 10 };
        let (_dir, path) = passphrase_file("pw\n");
        let args = key_args(Some(path), None);
        let stored = args.session(&params).unwrap().pack("secret").unwrap();
        let unpacked = args.session(&params).unwrap().unpack(&stored);
        assert_eq!(unpacked, Unpacked::Secret("secret".into()));
    }

    #[test]
    fn exit_status_reflects_outcome() {
        assert_eq!(report(&Unpacked::Secret("s".into())), 0);
        assert_eq!(report(&Unpacked::Legacy("s".into())), 0);
        let failed = Unpacked::Failed {
            raw: String::new(),
            reason: UnpackFailure::UnrecognizedFormat,
        };
        assert_eq!(report(&failed), EXIT_UNRECOVERABLE);
    }
}
