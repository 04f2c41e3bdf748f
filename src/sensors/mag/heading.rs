use std::f32::consts::PI;

use nalgebra::Vector3;

/// Echange X et Y (montage du capteur tourné)
pub fn swap_xy(vector: &Vector3<f32>) -> Vector3<f32> {
    Vector3::new(vector.y, vector.x, vector.z)
}

/// Calcule le cap en degrés, dans [0, 360).
///
/// `declination` est en radians. La normalisation ne corrige qu'un seul tour : l'angle
/// avant correction doit rester dans [-2π, 4π).
pub fn heading(vector: &Vector3<f32>, declination: f32, flip: bool) -> f32 {
    let vector = if flip { swap_xy(vector) } else { *vector };

    // Convention de signe fixée par le montage du capteur
    let mut heading = (-vector.x).atan2(vector.y);

    // Correction de la déclinaison magnétique
    heading += declination;

    // Normalisation entre 0 et 2π
    if heading < 0.0 {
        heading += 2.0 * PI;
    }
    if heading >= 2.0 * PI {
        heading -= 2.0 * PI;
    }

    let degrees = heading * (180.0 / PI);

    // Arrondi f32 : un angle juste sous 2π peut donner 360.0
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}
