const RESPONSE_SHAPE: &str = r#"Respond with ONLY a JSON object in this exact format:
{
	"resalable": {
		"is_resalable": true/false,
		"platforms": ["platform1", "platform2"],
		"condition": "Detailed description of item condition",
		"value": "Estimated value range",
		"tips": "Tips for successful resale"
	},
	"recyclable": {
		"is_recyclable": true/false,
		"centers": ["center1", "center2"],
		"material": "Detailed material composition",
		"process": "How this item is recycled",
		"impact": "Environmental impact of recycling this item"
	},
	"reusable": {
		"is_reusable": true/false,
		"ways": ["way1", "way2"],
		"durability": "Expected durability for reuse",
		"benefits": "Benefits of reusing this item",
		"tutorial": "Brief steps for repurposing"
	},
	"carbon_footprint": {
		"production": "Estimated carbon footprint from production",
		"usage": "Estimated carbon footprint from usage",
		"disposal": "Estimated carbon footprint from disposal",
		"total_estimate": "Total carbon footprint estimate",
		"reduction_tips": ["tip1", "tip2"]
	},
	"biodegradable": true/false,
	"time_to_degrade": "Estimated time to biodegrade",
	"description": "Comprehensive description of the item and its sustainability aspects"
}"#;

const GUIDELINES: &str = "Guidelines:
1. For resalable items:
   - Suggest real platforms like OLX, Quickr, or Facebook Marketplace
   - Provide realistic value estimates
   - Include condition assessment and selling tips

2. For recyclable items:
   - Only list real recycling centers in Chaithanya Layout, 8th Phase, J. P. Nagar, Bengaluru
   - Detail the material composition
   - Explain the recycling process and environmental benefits

3. For reusable items:
   - Suggest practical and creative ways to reuse
   - Include durability assessment
   - Provide step-by-step repurposing guidance

4. For carbon footprint:
   - Provide realistic estimates for production, usage, and disposal
   - Express total carbon footprint in kg of CO2 equivalent
   - Suggest actionable tips to reduce the carbon footprint
   - Consider the item's entire lifecycle

5. For biodegradable assessment:
   - Base on material composition
   - Include realistic degradation timeframe
   - Explain environmental impact

Provide detailed, practical information that would be helpful for users \
making sustainable decisions.
DO NOT add any text before or after the JSON.";

/// Builds the instruction sent alongside the image. The output depends only
/// on `categories`, so identical inputs always produce identical prompts.
pub fn build_analysis_prompt(categories: &[String]) -> String {
    // JSON array syntax keeps multi-word labels unambiguous.
    let labels = serde_json::to_string(categories).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analyze this image and the following waste categories: {}\n\n{}\n\n{}",
        labels, RESPONSE_SHAPE, GUIDELINES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_categories_in_order() {
        let labels = ["plastic bottle".to_string(), "Recyclable".to_string()];
        let prompt = build_analysis_prompt(&labels);
        assert!(prompt.starts_with(concat!(
            "Analyze this image and the following waste categories: ",
            "[\"plastic bottle\",\"Recyclable\"]\n\n"
        )));
    }

    #[test]
    fn contains_every_schema_field() {
        let prompt = build_analysis_prompt(&["general waste".to_string()]);
        for field in [
            "is_resalable",
            "platforms",
            "is_recyclable",
            "centers",
            "is_reusable",
            "ways",
            "tutorial",
            "total_estimate",
            "reduction_tips",
            "biodegradable",
            "time_to_degrade",
            "description",
        ] {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {field}");
        }
    }

    #[test]
    fn ends_with_guidelines() {
        let prompt = build_analysis_prompt(&[]);
        assert!(prompt.contains(concat!(
            "Provide detailed, practical information that would be helpful for users ",
            "making sustainable decisions.\nDO NOT add"
        )));
        assert!(prompt.contains("J. P. Nagar, Bengaluru"));
        assert!(prompt.contains("Express total carbon footprint in kg of CO2 equivalent"));
        assert!(prompt.ends_with("DO NOT add any text before or after the JSON."));
    }

    #[test]
    fn is_deterministic() {
        let labels = vec!["glass_containers".to_string()];
        assert_eq!(build_analysis_prompt(&labels), build_analysis_prompt(&labels));
    }
}
