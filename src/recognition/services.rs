use std::collections::HashMap;

use image::Rgb;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::{extract_json_object, AiProvider};

pub const VISION_PROMPT: &str = r#"Analyze this food image and identify:
1. All visible food items
2. Estimated portion sizes
3. Cooking method (raw, cooked, fried, etc.)
4. Confidence level for each item (0-100%)

Return as JSON with this structure:
{
    "foods": [
        {
            "name": "food item name",
            "portion": "estimated portion",
            "cooking_method": "raw/cooked/fried/etc",
            "confidence": 85
        }
    ]
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedFood {
    pub name: String,
    #[serde(default)]
    pub portion: Option<String>,
    #[serde(default)]
    pub cooking_method: Option<String>,
    /// Percent, 0 to 100.
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recognition {
    pub success: bool,
    pub foods: Vec<RecognizedFood>,
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    #[serde(default)]
    foods: Vec<RecognizedFood>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionEstimate {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

struct Reference {
    key: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

const fn r(key: &'static str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Reference {
    Reference {
        key,
        calories,
        protein,
        carbs,
        fat,
    }
}

/// Per-portion reference values; the first key found in a food name wins.
const NUTRITION_TABLE: [Reference; 10] = [
    r("chicken", 165.0, 31.0, 0.0, 3.6),
    r("beef", 250.0, 26.0, 0.0, 15.0),
    r("fish", 206.0, 22.0, 0.0, 12.0),
    r("rice", 130.0, 2.7, 28.0, 0.3),
    r("pasta", 131.0, 5.0, 25.0, 1.1),
    r("bread", 265.0, 9.0, 49.0, 3.2),
    r("vegetables", 25.0, 2.0, 5.0, 0.2),
    r("fruits", 60.0, 0.5, 15.0, 0.2),
    r("cheese", 113.0, 7.0, 1.0, 9.0),
    r("eggs", 155.0, 13.0, 1.1, 11.0),
];

pub fn parse_reply(reply: &str) -> Option<Vec<RecognizedFood>> {
    let json = extract_json_object(reply)?;
    let parsed: VisionReply = serde_json::from_str(json).ok()?;
    Some(
        parsed
            .foods
            .into_iter()
            .filter(|f| !f.name.trim().is_empty())
            .map(|mut f| {
                f.name = f.name.trim().to_string();
                f.confidence = f.confidence.clamp(0.0, 100.0);
                f
            })
            .collect(),
    )
}

/// Never fails: without a usable model reply the dominant colours of the
/// image are used, and an image that cannot be decoded yields an
/// unsuccessful result with no foods.
pub async fn recognize(ai: &dyn AiProvider, image: &[u8], mime: &str) -> Recognition {
    match ai.complete_with_image(VISION_PROMPT, image, mime).await {
        Ok(reply) => match parse_reply(&reply) {
            Some(foods) => {
                return Recognition {
                    success: true,
                    foods,
                }
            }
            None => debug!(reply_len = reply.len(), "vision reply carried no usable JSON"),
        },
        Err(e) => warn!(error = %e, "food recognition unavailable"),
    }
    colour_fallback(image).await
}

async fn colour_fallback(image: &[u8]) -> Recognition {
    let bytes = image.to_vec();
    match tokio::task::spawn_blocking(move || foods_from_colours(&bytes)).await {
        Ok(Some(foods)) if !foods.is_empty() => {
            debug!(foods = foods.len(), "recognized by dominant colours");
            Recognition {
                success: true,
                foods,
            }
        }
        Ok(_) => Recognition::default(),
        Err(e) => {
            warn!(error = %e, "colour analysis failed");
            Recognition::default()
        }
    }
}

/// Colours counted after shrinking the image and dropping the low three bits
/// of each channel, so near-identical shades pool together.
const FALLBACK_THUMBNAIL: u32 = 64;
const FALLBACK_TOP_COLOURS: usize = 5;
const FALLBACK_MAX_FOODS: usize = 3;

fn food_for_colour(Rgb([r, g, b]): Rgb<u8>) -> Option<(&'static str, f64)> {
    if g > r && g > b && g > 100 {
        Some(("Green vegetables", 60.0))
    } else if r > g && r > b && r > 100 {
        Some(("Red food (meat/tomatoes)", 50.0))
    } else if r > 80 && g > 80 && b < 100 {
        Some(("Brown food (bread/meat)", 45.0))
    } else if r > 150 && g > 150 && b > 150 {
        Some(("White food (rice/pasta)", 40.0))
    } else {
        None
    }
}

/// Rough guess from the five most common colours. `None` when the bytes are
/// not a decodable image.
pub fn foods_from_colours(bytes: &[u8]) -> Option<Vec<RecognizedFood>> {
    let img = image::load_from_memory(bytes)
        .ok()?
        .thumbnail(FALLBACK_THUMBNAIL, FALLBACK_THUMBNAIL)
        .to_rgb8();

    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    for Rgb(px) in img.pixels() {
        *counts.entry(px.map(|c| c & 0xF8)).or_default() += 1;
    }
    let mut ranked: Vec<([u8; 3], u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut foods: Vec<RecognizedFood> = Vec::new();
    for (colour, _) in ranked.into_iter().take(FALLBACK_TOP_COLOURS) {
        let Some((name, confidence)) = food_for_colour(Rgb(colour)) else {
            continue;
        };
        if foods.iter().any(|f| f.name == name) {
            continue;
        }
        foods.push(RecognizedFood {
            name: name.to_string(),
            portion: None,
            cooking_method: None,
            confidence,
        });
        if foods.len() == FALLBACK_MAX_FOODS {
            break;
        }
    }
    Some(foods)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn estimate_nutrition(foods: &[RecognizedFood]) -> NutritionEstimate {
    let (mut kcal, mut protein, mut carbs, mut fat) = (0.0, 0.0, 0.0, 0.0);
    for food in foods {
        let name = food.name.to_lowercase();
        if let Some(reference) = NUTRITION_TABLE.iter().find(|r| name.contains(r.key)) {
            let factor = food.confidence / 100.0;
            kcal += reference.calories * factor;
            protein += reference.protein * factor;
            carbs += reference.carbs * factor;
            fat += reference.fat * factor;
        }
    }
    NutritionEstimate {
        calories: kcal.round() as u32,
        protein: round1(protein),
        carbs: round1(carbs),
        fat: round1(fat),
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// Accepted upload: PNG or JPEG by content type, else by file extension.
pub fn image_kind(content_type: Option<&str>, file_name: Option<&str>) -> Option<(&'static str, &'static str)> {
    if let Some(ext) = content_type.and_then(ext_from_mime) {
        return Some((ext, if ext == "png" { "image/png" } else { "image/jpeg" }));
    }
    let ext = file_name?.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "png" => Some(("png", "image/png")),
        "jpg" | "jpeg" => Some(("jpg", "image/jpeg")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, RgbImage};

    use super::*;
    use crate::ai::mock::MockProvider;

    fn png(img: RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn food(name: &str, confidence: f64) -> RecognizedFood {
        RecognizedFood {
            name: name.into(),
            portion: None,
            cooking_method: None,
            confidence,
        }
    }

    #[test]
    fn estimate_scales_by_confidence() {
        let est = estimate_nutrition(&[food("Grilled chicken", 80.0), food("White rice", 100.0)]);
        // 165 * 0.8 + 130
        assert_eq!(est.calories, 262);
        assert_eq!(est.protein, 27.5);
        assert_eq!(est.carbs, 28.0);
    }

    #[test]
    fn unknown_foods_add_nothing() {
        assert_eq!(
            estimate_nutrition(&[food("byrek", 90.0)]),
            NutritionEstimate::default()
        );
    }

    #[test]
    fn first_matching_key_wins() {
        // "fish" precedes "rice" in the table
        let est = estimate_nutrition(&[food("fish with rice", 100.0)]);
        assert_eq!(est.calories, 206);
    }

    #[test]
    fn mime_and_extension_checks() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), None);
        assert_eq!(image_kind(None, Some("darka.JPEG")), Some(("jpg", "image/jpeg")));
        assert_eq!(
            image_kind(Some("application/octet-stream"), Some("x.png")),
            Some(("png", "image/png"))
        );
        assert_eq!(image_kind(Some("image/gif"), Some("x.gif")), None);
        assert_eq!(image_kind(None, None), None);
    }

    #[tokio::test]
    async fn recognize_parses_fenced_json() {
        let ai = MockProvider::default().with_vision(
            "```json\n{\"foods\": [{\"name\": \" eggs \", \"portion\": \"2\", \"confidence\": 140}]}\n```",
        );
        let out = recognize(&ai, b"img", "image/png").await;
        assert!(out.success);
        assert_eq!(out.foods[0].name, "eggs");
        assert_eq!(out.foods[0].confidence, 100.0);
    }

    #[tokio::test]
    async fn recognize_falls_back() {
        let out = recognize(&MockProvider::failing(), b"img", "image/png").await;
        assert_eq!(out, Recognition::default());

        let ai = MockProvider::default().with_vision("I see a sandwich.");
        assert!(!recognize(&ai, b"img", "image/png").await.success);
    }

    #[tokio::test]
    async fn solid_green_photo_falls_back_to_vegetables() {
        let photo = png(ImageBuffer::from_pixel(32, 32, Rgb([34, 139, 34])));
        let out = recognize(&MockProvider::failing(), &photo, "image/png").await;
        assert!(out.success);
        assert_eq!(out.foods.len(), 1);
        assert_eq!(out.foods[0].name, "Green vegetables");
        assert_eq!(out.foods[0].confidence, 60.0);
        assert_eq!(estimate_nutrition(&out.foods).calories, 15);
    }

    #[test]
    fn colour_guess_dedups_and_skips_dark_tones() {
        let img = ImageBuffer::from_fn(64, 64, |x, y| match (x < 32, y < 32) {
            (true, true) => Rgb([200, 30, 30]),
            (false, true) => Rgb([230, 230, 230]),
            (true, false) => Rgb([20, 20, 20]),
            (false, false) => Rgb([210, 40, 40]),
        });
        let foods = foods_from_colours(&png(img)).unwrap();
        let names: Vec<&str> = foods.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"Red food (meat/tomatoes)"));
        assert!(names.contains(&"White food (rice/pasta)"));
        assert_eq!(names.iter().filter(|n| n.starts_with("Red")).count(), 1);
        assert!(foods.len() <= FALLBACK_MAX_FOODS);

        let dark = png(ImageBuffer::from_pixel(8, 8, Rgb([10, 10, 10])));
        assert_eq!(foods_from_colours(&dark), Some(Vec::new()));
        assert_eq!(foods_from_colours(b"not an image"), None);
    }
}
