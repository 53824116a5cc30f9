//! The parsed form of one invocation: verb, object and positional arguments.

use std::fmt;
use std::str::FromStr;

use crate::error::{GcalError, GcalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    List,
    Add,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::List, Verb::Add, Verb::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Add => "add",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = GcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GcalError::UnknownCommand(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Object {
    Calendars,
    Events,
}

impl Object {
    pub const ALL: [Object; 2] = [Object::Calendars, Object::Events];

    pub fn as_str(self) -> &'static str {
        match self {
            Object::Calendars => "calendars",
            Object::Events => "events",
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Object {
    type Err = GcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Object::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| GcalError::UnknownCommand(s.to_string()))
    }
}

/// One invocation, built once from raw input and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    verb: Verb,
    object: Object,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(verb: Verb, object: Object, args: Vec<String>) -> Self {
        CommandSpec { verb, object, args }
    }

    /// Build from a verb the argument parser already recognised and the raw
    /// object token that followed it.
    pub fn from_parts(verb: Verb, object: Option<&str>, args: Vec<String>) -> GcalResult<Self> {
        let object = object.ok_or(GcalError::MissingArgument("object (calendars or events)"))?;
        let object = object
            .parse::<Object>()
            .map_err(|_| GcalError::UnknownCommand(format!("{} {}", verb, object)))?;

        Ok(CommandSpec::new(verb, object, args))
    }

    /// Build from raw tokens: `<verb> <object> [args...]`.
    pub fn parse<I, S>(tokens: I) -> GcalResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);

        let verb = tokens
            .next()
            .ok_or(GcalError::MissingArgument("command (list, add or delete)"))?
            .parse::<Verb>()?;
        let object = tokens.next();

        CommandSpec::from_parts(verb, object.as_deref(), tokens.collect())
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn object(&self) -> Object {
        self.object
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn pair(&self) -> (Verb, Object) {
        (self.verb, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verb_object_and_arguments() {
        let spec = CommandSpec::parse(["add", "events", "primary", "Standup"]).unwrap();
        assert_eq!(spec.pair(), (Verb::Add, Object::Events));
        assert_eq!(spec.args(), ["primary", "Standup"]);
        assert_eq!(spec.arg(1), Some("Standup"));
        assert_eq!(spec.arg(2), None);
    }

    #[test]
    fn unknown_verb_is_unknown_command() {
        let err = CommandSpec::parse(["update", "events"]).unwrap_err();
        assert!(matches!(err, GcalError::UnknownCommand(ref c) if c == "update"));
    }

    #[test]
    fn unknown_object_names_the_whole_pair() {
        let err = CommandSpec::parse(["list", "reminders"]).unwrap_err();
        assert!(matches!(err, GcalError::UnknownCommand(ref c) if c == "list reminders"));
    }

    #[test]
    fn missing_object_is_missing_argument() {
        assert!(matches!(
            CommandSpec::parse(["list"]),
            Err(GcalError::MissingArgument(_))
        ));
    }

    #[test]
    fn empty_input_is_missing_argument() {
        assert!(matches!(
            CommandSpec::parse(Vec::<String>::new()),
            Err(GcalError::MissingArgument(_))
        ));
    }

    #[test]
    fn verbs_and_objects_round_trip_through_their_names() {
        for verb in Verb::ALL {
            assert_eq!(verb.as_str().parse::<Verb>().unwrap(), verb);
        }
        for object in Object::ALL {
            assert_eq!(object.to_string().parse::<Object>().unwrap(), object);
        }
    }
}
