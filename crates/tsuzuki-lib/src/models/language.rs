use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! language_keys {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// Language tag of a chapter release.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
        #[serde(from = "String", into = "String")]
        pub enum LanguageKey {
            $($variant,)+
            #[default]
            Unknown,
        }

        impl LanguageKey {
            pub fn code(&self) -> &'static str {
                match self {
                    $(LanguageKey::$variant => $code,)+
                    LanguageKey::Unknown => "unknown",
                }
            }
        }

        impl FromStr for LanguageKey {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($code => Ok(LanguageKey::$variant),)+
                    "unknown" => Ok(LanguageKey::Unknown),
                    _ => Err(Error::UnknownLanguage(s.to_string())),
                }
            }
        }
    };
}

language_keys! {
    Arabic => "ar",
    Bulgarian => "bg",
    ChineseSimp => "zh-hans",
    ChineseTrad => "zh-hant",
    Czech => "cs",
    Dutch => "nl",
    English => "en",
    French => "fr",
    German => "de",
    Greek => "el",
    Hungarian => "hu",
    Indonesian => "id",
    Italian => "it",
    Japanese => "ja",
    Korean => "ko",
    Polish => "pl",
    PortugueseBr => "pt-br",
    PortuguesePt => "pt",
    Russian => "ru",
    SpanishEs => "es",
    SpanishLatam => "es-la",
    Thai => "th",
    Turkish => "tr",
    Ukrainian => "uk",
    Vietnamese => "vi",
}

impl fmt::Display for LanguageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// sources are free to send tags we don't know about
impl From<String> for LanguageKey {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(LanguageKey::Unknown)
    }
}

impl From<LanguageKey> for String {
    fn from(key: LanguageKey) -> Self {
        key.code().to_string()
    }
}
