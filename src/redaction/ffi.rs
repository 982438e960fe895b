//! FFI helpers for MuPDF annotation operations.
//!
//! The safe wrapper does not expose annotation geometry or colour, so
//! these reach through to the C API.
//!
//! # Safety
//! All functions use unsafe FFI calls to access MuPDF's C API. The
//! annotation must be valid and belong to a document opened on the
//! calling thread.

use mupdf::pdf::PdfAnnotation;
use mupdf::{Context, Rect};
use once_cell::sync::Lazy;
use std::sync::Mutex;

#[repr(C)]
struct PdfAnnotRaw {
    inner: *mut mupdf_sys::pdf_annot,
}

#[repr(C)]
struct ContextRaw {
    inner: *mut mupdf_sys::fz_context,
}

/// Serialises raw annotation edits across threads.
static ANNOT_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Runs `f` with the calling thread's MuPDF context.
///
/// The context is the per-thread clone the safe wrapper already uses, so
/// no context (and none of MuPDF's global locks) is created or dropped here.
unsafe fn with_raw<F>(annot: &PdfAnnotation, f: F)
where
    F: FnOnce(*mut mupdf_sys::fz_context, *mut mupdf_sys::pdf_annot),
{
    let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
    let ctx = std::mem::transmute::<Context, ContextRaw>(Context::get());

    if !ctx.inner.is_null() {
        let _guard = ANNOT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(ctx.inner, annot_raw.inner);
    }
}

/// Sets the rectangle for a PDF annotation.
pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: Rect) {
    with_raw(annot, |ctx, raw| {
        let fz_rect = mupdf_sys::fz_rect {
            x0: rect.x0,
            y0: rect.y0,
            x1: rect.x1,
            y1: rect.y1,
        };
        mupdf_sys::pdf_set_annot_rect(ctx, raw, fz_rect);
    });
}

/// Appends a quad covering `rect` to a text-markup annotation.
pub unsafe fn add_annotation_quad(annot: &PdfAnnotation, rect: Rect) {
    with_raw(annot, |ctx, raw| {
        let point = |x: f32, y: f32| mupdf_sys::fz_point { x, y };
        let quad = mupdf_sys::fz_quad {
            ul: point(rect.x0, rect.y0),
            ur: point(rect.x1, rect.y0),
            ll: point(rect.x0, rect.y1),
            lr: point(rect.x1, rect.y1),
        };
        mupdf_sys::pdf_add_annot_quad_point(ctx, raw, quad);
    });
}

/// Sets the RGB stroke colour.
pub unsafe fn set_annotation_color(annot: &PdfAnnotation, rgb: [f32; 3]) {
    with_raw(annot, |ctx, raw| {
        mupdf_sys::pdf_set_annot_color(ctx, raw, 3, rgb.as_ptr());
    });
}

pub unsafe fn set_annotation_opacity(annot: &PdfAnnotation, opacity: f32) {
    with_raw(annot, |ctx, raw| {
        mupdf_sys::pdf_set_annot_opacity(ctx, raw, opacity);
    });
}

/// Regenerates the appearance stream.
pub unsafe fn update_annotation(annot: &PdfAnnotation) {
    with_raw(annot, |ctx, raw| {
        mupdf_sys::pdf_update_annot(ctx, raw);
    });
}
