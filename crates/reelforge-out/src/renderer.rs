//! Handlebars renderer with custom helpers.

use crate::templates;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};
use reelforge_core::{Platform, PostingInstructions, Script, SegmentRole, Strategy};
use serde_json::json;
use std::collections::HashMap;

pub struct OutputRenderer {
    handlebars: Handlebars<'static>,
}

impl OutputRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_helper("join", Box::new(JoinHelper));
        handlebars.register_helper("truncate", Box::new(TruncateHelper));
        handlebars.register_helper("title", Box::new(TitleHelper));
        for (name, body) in templates::ALL {
            // Builtin templates are constants; render paths fall back to
            // plain text if one ever fails to register.
            let _ = handlebars.register_template_string(name, body);
        }
        Self { handlebars }
    }

    /// Caption: truncated hook plus the hashtag line.
    pub fn caption(&self, script: &Script) -> String {
        let hook = script
            .segment(SegmentRole::Hook)
            .map(|s| s.text.as_str())
            .unwrap_or_default();
        self.handlebars
            .render("caption", &json!({ "hook": hook, "hashtags": script.hashtags }))
            .unwrap_or_else(|_| hook.to_string())
            .trim()
            .to_string()
    }

    /// Full posting block for the artifact.
    pub fn posting(&self, platform: Platform, strategy: Strategy, script: &Script) -> PostingInstructions {
        PostingInstructions {
            caption: self.caption(script),
            posting_time_hint: templates::posting_window(platform_tag(platform)).to_string(),
            tips: templates::posting_tips(strategy.tag()),
        }
    }

    /// One-paragraph rationale for the response payload.
    pub fn business_rationale(&self, strategy: Strategy, reason: &str, script: &Script) -> String {
        self.handlebars
            .render(
                "business_rationale",
                &json!({
                    "strategy": strategy.tag().replace('_', " "),
                    "reason": reason,
                    "viral_score": script.viral_score,
                    "word_count": script.word_count,
                }),
            )
            .unwrap_or_else(|_| format!("{} path chosen", strategy.tag()))
    }

    /// Platform overlay lines keyed by platform tag.
    pub fn overlays(
        &self,
        platform: Platform,
        affiliate: bool,
        ai_assisted: bool,
    ) -> HashMap<String, Vec<String>> {
        let mut lines = Vec::new();
        if affiliate {
            lines.push(templates::OVERLAY_DISCLOSURE.to_string());
        }
        if ai_assisted {
            lines.push(templates::OVERLAY_AI.to_string());
        }
        HashMap::from([(platform_tag(platform).to_string(), lines)])
    }
}

impl Default for OutputRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn platform_tag(platform: Platform) -> &'static str {
    match platform {
        Platform::Tiktok => "tiktok",
        Platform::InstagramReels => "instagram_reels",
        Platform::YoutubeShorts => "youtube_shorts",
    }
}

struct JoinHelper;

impl HelperDef for JoinHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let array = h.param(0).and_then(|v| v.value().as_array());
        let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");
        if let Some(arr) = array {
            let strings: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from).or_else(|| Some(v.to_string())))
                .collect();
            out.write(&strings.join(separator))?;
        }
        Ok(())
    }
}

struct TruncateHelper;

impl HelperDef for TruncateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
        let max_len = h.param(1).and_then(|v| v.value().as_u64()).unwrap_or(100) as usize;
        if text.chars().count() > max_len {
            let cut: String = text.chars().take(max_len).collect();
            out.write(&cut)?;
            out.write("...")?;
        } else {
            out.write(text)?;
        }
        Ok(())
    }
}

struct TitleHelper;

impl HelperDef for TitleHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
        let mut chars = text.chars();
        if let Some(first) = chars.next() {
            out.write(&first.to_uppercase().to_string())?;
            out.write(chars.as_str())?;
        }
        Ok(())
    }
}
