//! Parsers voor configuratiedocumenten.

pub mod surface_xml;
