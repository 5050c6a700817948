use crate::model::Condition;

/// Glyph shown for anything we do not have a dedicated symbol for.
pub const DEFAULT_GLYPH: &str = "🌤️";

pub fn glyph(condition: Condition) -> &'static str {
    match condition {
        Condition::Clear => "☀️",
        Condition::Clouds => "☁️",
        Condition::Rain => "🌧️",
        Condition::Snow => "❄️",
        Condition::Thunderstorm => "⛈️",
        Condition::Drizzle => "🌦️",
        Condition::Mist | Condition::Smoke | Condition::Haze | Condition::Fog => "🌫️",
        Condition::Other => DEFAULT_GLYPH,
    }
}

/// Glyph for a raw provider classification such as `"Rain"`.
pub fn glyph_for_main(main: &str) -> &'static str {
    glyph(Condition::from_main(main))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_condition_has_a_glyph() {
        for c in Condition::all() {
            assert!(!glyph(*c).is_empty(), "{c} has no glyph");
        }
    }

    #[test]
    fn unknown_strings_fall_back_to_default() {
        assert_eq!(glyph_for_main("Tornado"), DEFAULT_GLYPH);
        assert_eq!(glyph_for_main(""), glyph(Condition::Other));
    }

    #[test]
    fn obscured_sky_conditions_share_a_glyph() {
        let fog = glyph(Condition::Fog);
        for c in [Condition::Mist, Condition::Smoke, Condition::Haze] {
            assert_eq!(glyph(c), fog);
        }
    }

    #[test]
    fn mapping_is_stable() {
        for c in Condition::all() {
            assert_eq!(glyph(*c), glyph(*c));
        }
        assert_eq!(glyph_for_main("Snow"), "❄️");
    }
}
