use std::io::Read;

use {
    anyhow::Result,
    clap::Args,
    pwvault_config::GeneratorConfig,
    pwvault_core::{PasswordPolicy, StrengthReport, generate, score, strength::MAX_SCORE},
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Password length (defaults to the configured policy).
    #[arg(short, long)]
    pub length: Option<usize>,
    /// Leave out A-Z.
    #[arg(long)]
    pub no_uppercase: bool,
    /// Leave out a-z.
    #[arg(long)]
    pub no_lowercase: bool,
    /// Leave out 0-9.
    #[arg(long)]
    pub no_numbers: bool,
    /// Leave out symbols.
    #[arg(long)]
    pub no_symbols: bool,
    /// Keep look-alike characters (i, l, 1, L, o, 0, O).
    #[arg(long)]
    pub allow_similar: bool,
    /// Number of passwords to print.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
    /// Print only the passwords, without strength.
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateArgs {
    /// Apply the flags on top of the configured policy. Flags only ever
    /// narrow the configured character classes.
    fn policy(&self, base: &PasswordPolicy) -> PasswordPolicy {
        PasswordPolicy {
            length: self.length.unwrap_or(base.length),
            include_uppercase: base.include_uppercase && !self.no_uppercase,
            include_lowercase: base.include_lowercase && !self.no_lowercase,
            include_numbers: base.include_numbers && !self.no_numbers,
            include_symbols: base.include_symbols && !self.no_symbols,
            exclude_similar: base.exclude_similar && !self.allow_similar,
        }
    }
}

pub fn handle_generate(args: &GenerateArgs, config: &GeneratorConfig) -> Result<()> {
    let policy = args.policy(&config.policy);
    policy.validate_length(config.min_length, config.max_length)?;

    for _ in 0..args.count {
        let password = generate(&policy)?;
        if args.quiet {
            println!("{password}");
        } else {
            println!("{password}  [{}]", describe(&score(&password)));
        }
    }
    Ok(())
}

pub fn handle_strength(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            trim_newline(buf)
        },
    };
    println!("{}", describe(&score(&password)));
    Ok(())
}

fn describe(report: &StrengthReport) -> String {
    format!("{} {}/{MAX_SCORE}", report.label, report.score)
}

/// Drop one trailing `\n` or `\r\n` left by a shell pipe.
pub fn trim_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            length: None,
            no_uppercase: false,
            no_lowercase: false,
            no_numbers: false,
            no_symbols: false,
            allow_similar: false,
            count: 1,
            quiet: false,
        }
    }

    #[test]
    fn flags_narrow_configured_policy() {
        let base = PasswordPolicy {
            include_symbols: false,
            ..PasswordPolicy::default()
        };
        let policy = GenerateArgs {
            length: Some(30),
            no_numbers: true,
            allow_similar: true,
            ..args()
        }
        .policy(&base);

        assert_eq!(policy.length, 30);
        assert!(policy.include_uppercase);
        assert!(!policy.include_numbers);
        assert!(!policy.include_symbols);
        assert!(!policy.exclude_similar);
    }

    #[test]
    fn out_of_range_length_is_rejected() {
        let config = GeneratorConfig::default();
        let result = handle_generate(
            &GenerateArgs {
                length: Some(500),
                ..args()
            },
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn describe_report() {
        assert_eq!(describe(&score("password")), "Weak 2/7");
    }

    #[test]
    fn trims_one_newline() {
        assert_eq!(trim_newline("abc\r\n".into()), "abc");
        assert_eq!(trim_newline("abc\n\n".into()), "abc\n");
        assert_eq!(trim_newline("abc".into()), "abc");
    }
}
