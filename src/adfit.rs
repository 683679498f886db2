//! Third-party ad widget injection
//!
//! Fully independent of the simulator: reads the viewport width once at mount
//! to pick a layout variant, appends the ad markup and loader script to a host
//! element, and ignores every DOM failure.

/// Ad slot dimensions and unit id for one layout variant
struct AdVariant {
    width: &'static str,
    height: &'static str,
    unit: &'static str,
}

/// Narrow viewports get the mobile banner, everything else the leaderboard
fn pick_variant(viewport_width: f64) -> AdVariant {
    if viewport_width < 1024.0 {
        AdVariant {
            width: "320",
            height: "100",
            unit: "",
        }
    } else {
        AdVariant {
            width: "728",
            height: "90",
            unit: "DAN-PeBO8UnSwYiS9Gqv",
        }
    }
}

/// Inject the ad markup into the element with the given id. Idempotent per
/// host: a second call finds the ad area already present and does nothing.
#[cfg(target_arch = "wasm32")]
pub fn inject(host_id: &str) {
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else { return };
    let Some(document) = window.document() else { return };
    let Some(host) = document.get_element_by_id(host_id) else {
        log::warn!("Ad host #{host_id} not found");
        return;
    };

    if host.query_selector(".kakao_ad_area").ok().flatten().is_some() {
        return;
    }

    let viewport_width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0);
    let variant = pick_variant(viewport_width);

    let Ok(ins) = document.create_element("ins") else { return };
    ins.set_class_name("kakao_ad_area");
    if let Some(el) = ins.dyn_ref::<web_sys::HtmlElement>() {
        let _ = el.style().set_property("display", "block");
    }
    let _ = ins.set_attribute("data-ad-width", variant.width);
    let _ = ins.set_attribute("data-ad-height", variant.height);
    let _ = ins.set_attribute("data-ad-unit", variant.unit);

    let Ok(script) = document.create_element("script") else { return };
    let Some(script) = script.dyn_ref::<web_sys::HtmlScriptElement>().cloned() else {
        return;
    };
    script.set_async(true);
    script.set_type("text/javascript");
    script.set_src("//t1.daumcdn.net/kas/static/ba.min.js");

    let _ = host.append_child(&ins);
    let _ = host.append_child(&script);
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
pub fn inject(_host_id: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_breakpoint() {
        let mobile = pick_variant(1023.0);
        assert_eq!((mobile.width, mobile.height), ("320", "100"));
        assert!(mobile.unit.is_empty());

        let desktop = pick_variant(1024.0);
        assert_eq!((desktop.width, desktop.height), ("728", "90"));
        assert!(!desktop.unit.is_empty());
    }
}
