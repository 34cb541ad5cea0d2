use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Paragraph;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use seedling_core::{FieldType, Value};

use crate::assets::{mock_file_jpeg, mock_file_txt};
use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext, Requirement};
use crate::mapping::{Strategy, TypeTable};
use crate::params::Params;

pub const MAX_INT: i64 = 10000;
/// Length used for strings and text when the field declares no bound.
pub const MAX_LENGTH: u32 = 300;
const DEFAULT_MAX_DIGITS: u32 = 10;
const DEFAULT_DECIMAL_PLACES: u32 = 2;
const URL_NAME_LENGTH: usize = 30;
const DATE_SPAN_SECONDS: i64 = 365 * 24 * 60 * 60;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SLUG_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-_";

const MAX_LENGTH_REQUIRED: &[Requirement] = &[Requirement::Attr("max_length")];
const DECIMAL_REQUIRED: &[Requirement] = &[
    Requirement::Attr("max_digits"),
    Requirement::Attr("decimal_places"),
];

/// Registers the value generators for every non-relation field type.
pub fn register(table: &mut TypeTable) {
    let integer: Arc<dyn Generator> = Arc::new(IntegerGenerator {
        id: "integer",
        min: -MAX_INT,
    });
    let positive: Arc<dyn Generator> = Arc::new(IntegerGenerator {
        id: "integer.positive",
        min: 0,
    });

    table.insert(FieldType::Boolean, Strategy::Generate(Arc::new(BooleanGenerator)));
    for field_type in [
        FieldType::Integer,
        FieldType::BigInteger,
        FieldType::SmallInteger,
    ] {
        table.insert(field_type, Strategy::Generate(Arc::clone(&integer)));
    }
    for field_type in [
        FieldType::PositiveInteger,
        FieldType::PositiveSmallInteger,
    ] {
        table.insert(field_type, Strategy::Generate(Arc::clone(&positive)));
    }
    table.insert(FieldType::Float, Strategy::Generate(Arc::new(FloatGenerator)));
    table.insert(FieldType::Decimal, Strategy::Generate(Arc::new(DecimalGenerator)));
    table.insert(FieldType::Char, Strategy::Generate(Arc::new(StringGenerator)));
    table.insert(FieldType::Text, Strategy::Generate(Arc::new(TextGenerator)));
    table.insert(FieldType::Slug, Strategy::Generate(Arc::new(SlugGenerator)));
    table.insert(FieldType::Url, Strategy::Generate(Arc::new(UrlGenerator)));
    table.insert(FieldType::Email, Strategy::Generate(Arc::new(EmailGenerator)));
    table.insert(FieldType::Uuid, Strategy::Generate(Arc::new(UuidGenerator)));
    table.insert(FieldType::Date, Strategy::Generate(Arc::new(DateGenerator)));
    table.insert(FieldType::DateTime, Strategy::Generate(Arc::new(DateTimeGenerator)));
    table.insert(FieldType::Time, Strategy::Generate(Arc::new(TimeGenerator)));
    table.insert(FieldType::File, Strategy::Generate(Arc::new(FileGenerator)));
    table.insert(FieldType::Image, Strategy::Generate(Arc::new(ImageGenerator)));
}

struct BooleanGenerator;

impl Generator for BooleanGenerator {
    fn id(&self) -> &'static str {
        "boolean"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::Bool(rng.random_bool(0.5)))
    }
}

struct IntegerGenerator {
    id: &'static str,
    min: i64,
}

impl Generator for IntegerGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::Int(rng.random_range(self.min..=MAX_INT)))
    }
}

struct FloatGenerator;

impl Generator for FloatGenerator {
    fn id(&self) -> &'static str {
        "float"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let bound = MAX_INT as f64;
        Ok(Value::Float(rng.random_range(-bound..bound)))
    }
}

struct DecimalGenerator;

impl Generator for DecimalGenerator {
    fn id(&self) -> &'static str {
        "decimal"
    }

    fn required(&self) -> &[Requirement] {
        DECIMAL_REQUIRED
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let max_digits = params.get_u32("max_digits")?.unwrap_or(DEFAULT_MAX_DIGITS);
        let places = params
            .get_u32("decimal_places")?
            .unwrap_or(DEFAULT_DECIMAL_PLACES);
        if places > max_digits {
            return Err(GenerationError::InvalidParam(
                "decimal_places must be <= max_digits".to_string(),
            ));
        }
        Ok(Value::Decimal(random_decimal(max_digits, places, rng)))
    }
}

fn random_decimal(max_digits: u32, places: u32, rng: &mut dyn RngCore) -> String {
    let whole = random_digits((max_digits - places) as usize, rng);
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    if places == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{}", random_digits(places as usize, rng))
    }
}

fn random_digits(len: usize, rng: &mut dyn RngCore) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

struct StringGenerator;

impl Generator for StringGenerator {
    fn id(&self) -> &'static str {
        "string"
    }

    fn required(&self) -> &[Requirement] {
        MAX_LENGTH_REQUIRED
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let max_length = params.get_u32("max_length")?.unwrap_or(MAX_LENGTH);
        Ok(Value::Text(random_string(max_length as usize, LETTERS, rng)))
    }
}

fn random_string(len: usize, charset: &[u8], rng: &mut dyn RngCore) -> String {
    (0..len)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

struct TextGenerator;

impl Generator for TextGenerator {
    fn id(&self) -> &'static str {
        "text"
    }

    fn required(&self) -> &[Requirement] {
        MAX_LENGTH_REQUIRED
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let max_length = params.get_u32("max_length")?.unwrap_or(MAX_LENGTH) as usize;
        let paragraph: String = Paragraph(2..5).fake_with_rng(rng);
        let text: String = paragraph.chars().take(max_length).collect();
        Ok(Value::Text(text.trim_end().to_string()))
    }
}

struct SlugGenerator;

impl Generator for SlugGenerator {
    fn id(&self) -> &'static str {
        "slug"
    }

    fn required(&self) -> &[Requirement] {
        MAX_LENGTH_REQUIRED
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let max_length = params.get_u32("max_length")?.unwrap_or(MAX_LENGTH) as usize;
        if max_length == 0 {
            return Ok(Value::Text(String::new()));
        }
        // first character stays alphanumeric
        let mut slug = random_string(1, &SLUG_CHARSET[..36], rng);
        slug.push_str(&random_string(max_length - 1, SLUG_CHARSET, rng));
        Ok(Value::Text(slug))
    }
}

struct UrlGenerator;

impl Generator for UrlGenerator {
    fn id(&self) -> &'static str {
        "url"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let name = random_string(URL_NAME_LENGTH, LETTERS, rng).to_lowercase();
        Ok(Value::Text(format!("http://www.{name}.com")))
    }
}

struct EmailGenerator;

impl Generator for EmailGenerator {
    fn id(&self) -> &'static str {
        "email"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let email: String = SafeEmail().fake_with_rng(rng);
        Ok(Value::Text(email))
    }
}

struct UuidGenerator;

impl Generator for UuidGenerator {
    fn id(&self) -> &'static str {
        "uuid"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Ok(Value::Uuid(uuid.to_string()))
    }
}

struct DateGenerator;

impl Generator for DateGenerator {
    fn id(&self) -> &'static str {
        "date"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::Date(recent_datetime(rng).date()))
    }
}

struct DateTimeGenerator;

impl Generator for DateTimeGenerator {
    fn id(&self) -> &'static str {
        "datetime"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::DateTime(recent_datetime(rng)))
    }
}

/// Latest moment a generated date or datetime can take. Values fall in the
/// year before it, so they depend on the rng alone.
fn date_anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn recent_datetime(rng: &mut dyn RngCore) -> NaiveDateTime {
    let offset = rng.random_range(0..=DATE_SPAN_SECONDS);
    date_anchor() - Duration::seconds(offset)
}

struct TimeGenerator;

impl Generator for TimeGenerator {
    fn id(&self) -> &'static str {
        "time"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let seconds = rng.random_range(0..86400u32);
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default();
        Ok(Value::Time(time))
    }
}

struct FileGenerator;

impl Generator for FileGenerator {
    fn id(&self) -> &'static str {
        "file"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::File(mock_file_txt().display().to_string()))
    }
}

struct ImageGenerator;

impl Generator for ImageGenerator {
    fn id(&self) -> &'static str {
        "image"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &Params,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok(Value::File(mock_file_jpeg().display().to_string()))
    }
}

/// Picks a registered model as a content-type entry.
pub struct ContentTypeGenerator;

impl Generator for ContentTypeGenerator {
    fn id(&self) -> &'static str {
        "content_type"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let labels: Vec<String> = ctx.registry.models().map(|model| model.label()).collect();
        let label = labels.choose(rng).ok_or_else(|| {
            GenerationError::InvalidParam("content type registry is empty".to_string())
        })?;
        Ok(Value::ContentType(label.clone()))
    }
}

/// Uniform pick from a field's declared choices.
pub struct FromChoices {
    choices: Vec<Value>,
}

impl FromChoices {
    pub fn new(choices: Vec<Value>) -> Self {
        Self { choices }
    }
}

impl Generator for FromChoices {
    fn id(&self) -> &'static str {
        "choices"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        _params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        self.choices.choose(rng).cloned().ok_or_else(|| {
            GenerationError::InvalidParam(format!("{} declares no choices", ctx.field.name))
        })
    }
}
