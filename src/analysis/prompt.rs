//! Instructions sent alongside the descriptions

/// System instruction for profile analysis, including the JSON contract the
/// reply must follow
pub fn profile_system_prompt() -> String {
    "You are an expert 3D printing consultant specializing in slicing profiles and parameter \
optimization.\n\n\
Reply with a single JSON object and nothing else, using exactly these fields:\n\
{\n\
  \"overall_purpose\": string, the overall goal of these modifications,\n\
  \"model_type\": string, what type of model or print the creator is optimizing for,\n\
  \"visual_effects\": [string], expected visual effects of the changes,\n\
  \"functional_effects\": [string], expected functional effects of the changes,\n\
  \"trade_offs\": [string], compromises these settings might introduce,\n\
  \"optimization_suggestions\": [string], suggestions for further optimization,\n\
  \"parameter_effects\": [{\n\
    \"parameter\": string, the modified parameter,\n\
    \"original_value\": string | number | boolean,\n\
    \"new_value\": string | number | boolean,\n\
    \"purpose\": string, the likely purpose of this modification,\n\
    \"effect\": string, the expected effect on the print\n\
  }]\n\
}\n\
Include one parameter_effects entry per modified parameter."
        .to_string()
}

pub fn profile_user_message(description: &str) -> String {
    let mut out = String::with_capacity(description.len() + 128);
    out.push_str(
        "Analyze the following 3D printing slicing profile and explain the likely intentions \
of the creator based on the parameter modifications:\n\n",
    );
    out.push_str(description);
    out
}

pub fn troubleshooting_system_prompt() -> String {
    "You are an expert 3D printing troubleshooter. The user describes a print problem and \
provides the slicer configuration used to produce the G-code.\n\n\
Identify the settings most likely to cause the problem, quote their current values, and \
suggest concrete new values. Order suggestions from most to least likely to help. \
If the problem is probably mechanical or material related rather than a slicer setting, \
say so. Answer in plain text."
        .to_string()
}

pub fn troubleshooting_user_message(description: &str) -> String {
    let mut out = String::with_capacity(description.len() + 64);
    out.push_str("Help me fix this print problem.\n\n");
    out.push_str(description);
    out
}
