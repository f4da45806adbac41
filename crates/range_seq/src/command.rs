//! Text records of the operation protocol (`ADD`, `REVERSE`, `REVOLVE`,
//! `INSERT`, `DELETE`, `MIN`), decoupled from any I/O: a driver parses each
//! line into a [`Command`] and applies it to a sequence.

use std::str::FromStr;

use thiserror::Error;

use crate::policy::RangeMinRangeAdd;
use crate::tree::{SeqError, SplaySeq};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `ADD l r d`: add `d` to every element of `l..=r`.
    Add { lo: usize, hi: usize, delta: i64 },
    /// `REVERSE l r`: reverse `l..=r`.
    Reverse { lo: usize, hi: usize },
    /// `REVOLVE l r t`: cyclically rotate `l..=r` right by `t`.
    Revolve { lo: usize, hi: usize, amount: i64 },
    /// `INSERT x p`: insert value `p` right after position `x` (`0` inserts
    /// at the front).
    Insert { after: usize, value: i64 },
    /// `DELETE x`: remove the element at position `x`.
    Delete { at: usize },
    /// `MIN l r`: minimum over `l..=r`; the only record that produces
    /// output.
    Min { lo: usize, hi: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command line")]
    EmptyLine,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{name} takes {expected} arguments, got {got}")]
    BadArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("malformed integer {0:?}")]
    BadInteger(String),
}

fn parse_int<T: FromStr>(token: &str) -> Result<T, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::BadInteger(token.to_string()))
}

fn check_arity(
    name: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), CommandError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CommandError::BadArity {
            name,
            expected,
            got: args.len(),
        })
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Err(CommandError::EmptyLine);
        };
        let args = tokens.collect::<Vec<_>>();
        match name {
            "ADD" => {
                check_arity("ADD", &args, 3)?;
                Ok(Command::Add {
                    lo: parse_int(args[0])?,
                    hi: parse_int(args[1])?,
                    delta: parse_int(args[2])?,
                })
            }
            "REVERSE" => {
                check_arity("REVERSE", &args, 2)?;
                Ok(Command::Reverse {
                    lo: parse_int(args[0])?,
                    hi: parse_int(args[1])?,
                })
            }
            "REVOLVE" => {
                check_arity("REVOLVE", &args, 3)?;
                Ok(Command::Revolve {
                    lo: parse_int(args[0])?,
                    hi: parse_int(args[1])?,
                    amount: parse_int(args[2])?,
                })
            }
            "INSERT" => {
                check_arity("INSERT", &args, 2)?;
                Ok(Command::Insert {
                    after: parse_int(args[0])?,
                    value: parse_int(args[1])?,
                })
            }
            "DELETE" => {
                check_arity("DELETE", &args, 1)?;
                Ok(Command::Delete {
                    at: parse_int(args[0])?,
                })
            }
            "MIN" => {
                check_arity("MIN", &args, 2)?;
                Ok(Command::Min {
                    lo: parse_int(args[0])?,
                    hi: parse_int(args[1])?,
                })
            }
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}

impl Command {
    /// Runs the record against `seq`. `MIN` yields the queried minimum;
    /// every other record yields `None`.
    pub fn apply(self, seq: &mut SplaySeq<RangeMinRangeAdd>) -> Result<Option<i64>, SeqError> {
        match self {
            Command::Add { lo, hi, delta } => {
                seq.range_add(lo, hi, delta)?;
                Ok(None)
            }
            Command::Reverse { lo, hi } => {
                seq.range_reverse(lo, hi)?;
                Ok(None)
            }
            Command::Revolve { lo, hi, amount } => {
                seq.range_rotate_right(lo, hi, amount)?;
                Ok(None)
            }
            Command::Insert { after, value } => {
                seq.insert_after(after, value)?;
                Ok(None)
            }
            Command::Delete { at } => {
                seq.delete_at(at)?;
                Ok(None)
            }
            Command::Min { lo, hi } => seq.range_min(lo, hi).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError};
    use crate::tree::SplaySeq;

    #[test]
    fn parses_every_record() {
        assert_eq!(
            "ADD 1 3 10".parse(),
            Ok(Command::Add {
                lo: 1,
                hi: 3,
                delta: 10
            })
        );
        assert_eq!("REVERSE 2 4".parse(), Ok(Command::Reverse { lo: 2, hi: 4 }));
        assert_eq!(
            "REVOLVE 1 5 -2".parse(),
            Ok(Command::Revolve {
                lo: 1,
                hi: 5,
                amount: -2
            })
        );
        assert_eq!(
            "INSERT 0 100".parse(),
            Ok(Command::Insert {
                after: 0,
                value: 100
            })
        );
        assert_eq!("DELETE 3".parse(), Ok(Command::Delete { at: 3 }));
        assert_eq!("MIN 1 5".parse(), Ok(Command::Min { lo: 1, hi: 5 }));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(CommandError::EmptyLine));
        assert_eq!(
            "   ".parse::<Command>(),
            Err(CommandError::EmptyLine)
        );
        assert_eq!(
            "SHUFFLE 1 2".parse::<Command>(),
            Err(CommandError::UnknownCommand("SHUFFLE".into()))
        );
        assert_eq!(
            "ADD 1 3".parse::<Command>(),
            Err(CommandError::BadArity {
                name: "ADD",
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            "MIN 1 x".parse::<Command>(),
            Err(CommandError::BadInteger("x".into()))
        );
        assert_eq!(
            "DELETE -1".parse::<Command>(),
            Err(CommandError::BadInteger("-1".into()))
        );
    }

    #[test]
    fn applies_a_script() {
        let mut seq = SplaySeq::new(&[5, 3, 8, 1, 9]);
        let script = [
            ("MIN 1 5", Some(1)),
            ("ADD 1 3 10", None),
            ("MIN 1 3", Some(13)),
            ("REVERSE 2 4", None),
            ("REVOLVE 1 5 2", None),
            ("DELETE 3", None),
            ("INSERT 0 100", None),
            ("MIN 1 5", Some(1)),
        ];
        for (line, expected) in script {
            let cmd: Command = line.parse().unwrap();
            assert_eq!(cmd.apply(&mut seq), Ok(expected), "{line}");
        }
        assert_eq!(seq.to_vec(), vec![100, 13, 9, 1, 18]);
    }
}
