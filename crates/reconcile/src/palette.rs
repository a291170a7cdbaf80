//! Accent colours for new catalog entries.

use rand::Rng;
use rand::seq::SliceRandom;

/// CSS colour names, capitalised the way the blog front end expects them.
///
/// `Lightsalmon` and `Mediumslateblue` appear twice, which makes them twice
/// as likely to be picked. Existing entries were styled with this list, so
/// it stays as it is.
pub const DEFAULT_PALETTE: &[&str] = &[
    "Indianred", "Lightcoral", "Salmon", "Darksalmon", "Lightsalmon", "Crimson", "Red", "Firebrick",
    "Darkred", "Pink", "Lightpink", "Hotpink", "Deeppink", "Mediumvioletred", "Palevioletred", "Lightsalmon",
    "Coral", "Tomato", "Orangered", "Darkorange", "Orange", "Gold", "Yellow", "Lightyellow", "Lemonchiffon",
    "Lightgoldenrodyellow", "Papayawhip", "Moccasin", "Peachpuff", "Palegoldenrod", "Khaki", "Darkkhaki",
    "Greenyellow", "Chartreuse", "Lawngreen", "Lime", "Limegreen", "Palegreen", "Lightgreen",
    "Mediumspringgreen", "Springgreen", "Mediumseagreen", "Seagreen", "Forestgreen", "Green", "Darkgreen",
    "Yellowgreen", "Olivedrab", "Olive", "Darkolivegreen", "Mediumaquamarine", "Darkseagreen",
    "Lightseagreen", "Darkcyan", "Teal", "Aqua", "Cyan", "Lightcyan", "Paleturquoise", "Aquamarine",
    "Turquoise", "Mediumturquoise", "Darkturquoise", "Cadetblue", "Steelblue", "Lightsteelblue",
    "Powderblue", "Lightblue", "Skyblue", "Lightskyblue", "Deepskyblue", "Dodgerblue", "Cornflowerblue",
    "Mediumslateblue", "Royalblue", "Blue", "Mediumblue", "Darkblue", "Navy", "Midnightblue", "Lavender",
    "Thistle", "Plum", "Violet", "Orchid", "Fuchsia", "Magenta", "Mediumorchid", "Mediumpurple",
    "Rebeccapurple", "Blueviolet", "Darkviolet", "Darkorchid", "Darkmagenta", "Purple", "Indigo",
    "Slateblue", "Darkslateblue", "Mediumslateblue", "Cornsilk", "Blanchedalmond", "Bisque", "Navajowhite",
    "Wheat", "Burlywood", "Tan", "Rosybrown", "Sandybrown", "Goldenrod", "Darkgoldenrod", "Peru",
    "Chocolate", "Saddlebrown", "Sienna", "Brown", "Maroon", "Snow", "Honeydew", "Mintcream", "Azure",
    "Aliceblue", "Ghostwhite", "Whitesmoke", "Seashell", "Beige", "Oldlace", "Floralwhite", "Ivory",
    "Antiquewhite", "Linen", "Lavenderblush", "Mistyrose", "Gainsboro", "Lightgray", "Silver", "Darkgray",
    "Gray", "Dimgray", "Lightslategray", "Slategray", "Darkslategray", "Black",
];

/// Pick one colour uniformly from the palette.
///
/// Returns `None` for an empty palette.
pub fn pick<'a, R, S>(rng: &mut R, palette: &'a [S]) -> Option<&'a str>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    palette.choose(rng).map(AsRef::as_ref)
}

/// The default palette as owned strings, for configuration.
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}
