use entities::Geocode;
use runtime::Page;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::{adopt_view_listeners, clear_views, dom, gallery, state_gone, with_state};

// Thin binding over the page's Google Maps script. One map instance at a
// time; creating a new one discards the previous one.
#[wasm_bindgen(inline_js = "
let __explorer_map = null;
let __explorer_info = null;

export function explorer_map_create(container_id, lat, lng, zoom) {
    const el = document.getElementById(container_id);
    if (!el) throw new Error('missing #' + container_id);
    if (typeof google === 'undefined' || !google.maps) throw new Error('Google Maps is not loaded');
    __explorer_map = new google.maps.Map(el, {
        center: new google.maps.LatLng(lat, lng),
        zoom: zoom,
        mapTypeId: google.maps.MapTypeId.ROADMAP,
    });
    __explorer_info = new google.maps.InfoWindow();
}

export function explorer_map_add_marker(lat, lng, icon, title, image_url, on_click) {
    if (!__explorer_map) throw new Error('map not created');
    const marker = new google.maps.Marker({
        position: new google.maps.LatLng(lat, lng),
        map: __explorer_map,
        icon: icon,
        title: title,
    });
    google.maps.event.addListener(marker, 'mouseover', () => {
        if (!image_url) return;
        const img = document.createElement('img');
        img.src = image_url;
        __explorer_info.setContent(img);
        __explorer_info.open(__explorer_map, marker);
    });
    google.maps.event.addListener(marker, 'mouseout', () => __explorer_info.close());
    google.maps.event.addListener(marker, 'click', () => on_click());
}

export function explorer_map_view() {
    if (!__explorer_map || !document.getElementById('map')) return null;
    const c = __explorer_map.getCenter();
    return [c.lat(), c.lng(), __explorer_map.getZoom()];
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn explorer_map_create(container_id: &str, lat: f64, lng: f64, zoom: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn explorer_map_add_marker(
        lat: f64,
        lng: f64,
        icon: &str,
        title: &str,
        image_url: &str,
        on_click: &js_sys::Function,
    ) -> Result<(), JsValue>;

    fn explorer_map_view() -> JsValue;
}

struct Marker {
    name: String,
    entity: entities::Entity,
    at: Geocode,
    image_url: String,
}

/// Map of the active collection with one marker per geocoded entity.
pub(crate) fn render_active() -> Result<(), JsValue> {
    let (markers, map_cfg) = with_state(|s| {
        s.session.show(Page::Map);
        let markers: Vec<Marker> = s
            .session
            .active
            .and_then(|kind| s.entities.collection(kind))
            .map(|c| {
                c.iter()
                    .filter_map(|(name, entity)| {
                        Some(Marker {
                            at: entity.geocode()?,
                            image_url: entity
                                .image()
                                .map(|file| s.config.image_url(file))
                                .unwrap_or_default(),
                            name: name.to_string(),
                            entity: entity.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        (markers, s.config.map.clone())
    })
    .ok_or_else(state_gone)?;

    clear_views()?;
    let doc = dom::document()?;
    let container = dom::create(&doc, "div", "map")?;
    container.set_id("map");
    dom::body()?.append_child(&container)?;

    explorer_map_create("map", map_cfg.center_lat, map_cfg.center_lng, map_cfg.zoom)?;
    let mut listeners = dom::Listeners::default();
    for Marker {
        name,
        entity,
        at,
        image_url,
    } in markers
    {
        let title = name.clone();
        let on_click = Closure::<dyn FnMut()>::new(move || gallery::open_pinned(&name, &entity));
        explorer_map_add_marker(
            at.lat,
            at.lng,
            &map_cfg.marker_icon,
            &title,
            &image_url,
            on_click.as_ref().unchecked_ref(),
        )?;
        listeners.push_callback(on_click);
    }
    tracing::debug!(markers = listeners.len(), "map rendered");
    adopt_view_listeners(listeners);
    Ok(())
}

pub(crate) fn current_info() -> Option<String> {
    let view = explorer_map_view();
    if view.is_null() || view.is_undefined() {
        return None;
    }
    let parts = js_sys::Array::from(&view);
    let lat = parts.get(0).as_f64()?;
    let lng = parts.get(1).as_f64()?;
    let zoom = parts.get(2).as_f64()?;
    Some(format_map_info(lat, lng, zoom))
}

pub(crate) fn format_map_info(lat: f64, lng: f64, zoom: f64) -> String {
    format!("{lat}, {lng}, {zoom}")
}
