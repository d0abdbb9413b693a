/// Errors that can occur when creating a validated measure identifier.
#[derive(Debug, thiserror::Error)]
pub enum MeasureIdError {
    /// The input was empty or contained only whitespace
    #[error("Measure id cannot be empty")]
    Empty,
}

/// Errors that can occur when creating a validated effective date.
#[derive(Debug, thiserror::Error)]
pub enum EffectiveDateError {
    /// The input was zero, which is reserved for "unset"
    #[error("Effective date cannot be zero")]
    Zero,
}

/// An eCQM measure identifier that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace
/// character. The input is automatically trimmed of leading and trailing
/// whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeasureId(String);

impl MeasureId {
    /// Creates a new `MeasureId` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(MeasureId)` if the trimmed input is non-empty,
    /// or `Err(MeasureIdError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, MeasureIdError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MeasureIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeasureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MeasureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for MeasureId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for MeasureId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MeasureId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The effective date of a quality measure calculation, encoded as a non-zero
/// 32-bit integer (for example `20230101` or a bare year).
///
/// Zero is rejected so that an unset date can never be mistaken for a real one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectiveDate(i32);

impl EffectiveDate {
    /// Creates a new `EffectiveDate` from the given integer encoding.
    ///
    /// # Returns
    ///
    /// Returns `Ok(EffectiveDate)` for any non-zero input,
    /// or `Err(EffectiveDateError::Zero)` for zero.
    pub fn new(value: i32) -> Result<Self, EffectiveDateError> {
        if value == 0 {
            return Err(EffectiveDateError::Zero);
        }
        Ok(Self(value))
    }

    /// Returns the inner integer encoding.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for EffectiveDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for EffectiveDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EffectiveDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        EffectiveDate::new(value).map_err(serde::de::Error::custom)
    }
}
