use serde::{de, Deserialize, Deserializer, Serialize};

fn default_one() -> f32 {
    1.0
}

fn is_one(num: &f32) -> bool {
    *num == 1.0
}

/// An 8-bit RGB color with a fractional alpha in `[0, 1]`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(skip_serializing_if = "is_one", default = "default_one")]
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 1.0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Components scaled to the `0.0..=1.0` range PDF color operators expect.
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    fn parse_hex(s: &str) -> Result<Color, String> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Err(format!("Color must start with #, got: {}", s));
        };

        let channel = |digits: &str, name: &str| {
            u8::from_str_radix(digits, 16).map_err(|e| format!("Invalid {} component: {}", name, e))
        };

        match hex.len() {
            3 => {
                let r = channel(&hex[0..1].repeat(2), "red")?;
                let g = channel(&hex[1..2].repeat(2), "green")?;
                let b = channel(&hex[2..3].repeat(2), "blue")?;
                Ok(Color::rgb(r, g, b))
            }
            6 => {
                let r = channel(&hex[0..2], "red")?;
                let g = channel(&hex[2..4], "green")?;
                let b = channel(&hex[4..6], "blue")?;
                Ok(Color::rgb(r, g, b))
            }
            _ => Err(format!(
                "Invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "default_one")]
                a: f32,
            },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Self::parse_hex(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b, a } => {
                if !(0.0..=1.0).contains(&a) {
                    return Err(de::Error::custom(format!(
                        "alpha must be within 0..=1, got {}",
                        a
                    )));
                }
                Ok(Color { r, g, b, a })
            }
        }
    }
}
