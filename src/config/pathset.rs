use core::str::{FromStr, Split};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    UnknownPath,
    ExpectValue,
    InvalidValue,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::UnknownPath => "Specified path not exists or invalid",
            Self::ExpectValue => "Expect value",
            Self::InvalidValue => "Value not valid",
        };
        write!(f, "{}", err_string)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Value<'a>(pub Option<&'a str>);

impl<'a> Value<'a> {
    pub fn of(string: &'a str) -> Value<'a> {
        Value(Some(string))
    }

    pub fn str(&self) -> Result<&'a str, Error> {
        self.0.ok_or(Error::ExpectValue)
    }

    pub fn parse<T: FromStr>(&self) -> Result<T, Error> {
        FromStr::from_str(self.str()?).map_err(|_| Error::InvalidValue)
    }

    pub fn parse_or<T: FromStr>(&self, or: T) -> Result<T, Error> {
        match self.0 {
            Some(s) => FromStr::from_str(s).map_err(|_| Error::InvalidValue),
            None => Ok(or),
        }
    }
}

/// Remaining segments of a dotted configuration path like `osd.vario.rows`
#[derive(Clone, Debug)]
pub struct Path<'a>(Split<'a, char>);

impl<'a> Path<'a> {
    pub fn new(path: &'a str) -> Self {
        Self(path.split('.'))
    }

    pub fn str(&mut self) -> Result<&'a str, Error> {
        self.0.next().ok_or(Error::UnknownPath)
    }
}

pub trait PathSet {
    fn set(&mut self, path: Path, value: Value) -> Result<(), Error>;
}
